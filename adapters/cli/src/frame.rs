//! Pure text projections of the session's query surface.

use river_chase_core::{AgentKind, AgentSnapshot, Event, Outcome, TileCoord, TileKind};
use river_chase_world::{query, Session};

/// Renders the terrain, coins, agents and HUD line as one frame.
pub(crate) fn render(session: &Session) -> String {
    let mut out = String::new();

    if let Some(grid) = query::terrain(session) {
        let coins = query::coins(session);
        let agents = query::agents(session);
        for row in 0..grid.rows() {
            for column in 0..grid.columns() {
                let tile = TileCoord::new(column, row);
                out.push(glyph(grid.kind(tile), tile, coins, &agents));
            }
            out.push('\n');
        }
    }

    let hud = query::hud(session);
    out.push_str(&format!(
        "coins P{}/{} H{}/{} | {}s left | score {} (best {}) | {}",
        hud.prey_coins,
        hud.coin_goal,
        hud.hunter_coins,
        hud.coin_goal,
        query::seconds_remaining(session),
        hud.score,
        hud.high_score,
        hud.message,
    ));
    out
}

/// Agents over coins over terrain; the submerged ambusher is not drawn.
fn glyph(
    kind: Option<TileKind>,
    tile: TileCoord,
    coins: &[TileCoord],
    agents: &[AgentSnapshot],
) -> char {
    for agent in agents {
        if agent.tile != tile || !agent.alive || !agent.visible {
            continue;
        }
        return match agent.kind {
            AgentKind::Hunter => 'H',
            AgentKind::Prey => 'P',
            AgentKind::Ambusher => 'A',
        };
    }
    if coins.contains(&tile) {
        return 'o';
    }
    match kind {
        Some(TileKind::River) => '~',
        Some(TileKind::Obstacle) => '#',
        _ => '.',
    }
}

/// One transcript line per notable event. Per-tick noise (clock updates,
/// routine movement) is filtered out.
pub(crate) fn describe(event: &Event) -> Option<String> {
    match event {
        Event::SessionStarted { controlled } => {
            Some(format!("round started, controlling the {}", name(*controlled)))
        }
        Event::SelectionRejected { kind, reason } => {
            Some(format!("cannot select the {}: {reason}", name(*kind)))
        }
        Event::AmbusherSurfaced { at } => Some(format!(
            "the ambusher surfaced at ({}, {})",
            at.column(),
            at.row()
        )),
        Event::AmbusherSubmerged => Some("the ambusher slipped back under".to_owned()),
        Event::CoinCollected { kind, .. } => {
            Some(format!("the {} collected a coin", name(*kind)))
        }
        Event::AgentBitten { kind, bites } => Some(format!(
            "the {} was bitten ({bites} wound{})",
            name(*kind),
            if *bites == 1 { "" } else { "s" }
        )),
        Event::PauseToggled { paused: true } => Some("paused".to_owned()),
        Event::PauseToggled { paused: false } => Some("resumed".to_owned()),
        Event::SessionReset => Some("session reset".to_owned()),
        Event::GameEnded { outcome } => Some(match outcome {
            Outcome::PreyCoinGoal => "game over: the prey reached the coin goal".to_owned(),
            Outcome::HunterCoinGoal => "game over: the hunter reached the coin goal".to_owned(),
            Outcome::TimeExpired {
                prey_coins,
                hunter_coins,
            } => format!("game over: time expired at prey {prey_coins}, hunter {hunter_coins}"),
            Outcome::PreyCaught => "game over: the hunter caught the prey".to_owned(),
            Outcome::PreyEaten => "game over: the ambusher finished the prey".to_owned(),
        }),
        Event::TimeAdvanced { .. } | Event::AgentMoved { .. } => None,
    }
}

fn name(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Hunter => "hunter",
        AgentKind::Prey => "prey",
        AgentKind::Ambusher => "ambusher",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use river_chase_core::Command;
    use river_chase_world::apply;

    #[test]
    fn per_tick_noise_is_filtered_from_the_transcript() {
        assert!(describe(&Event::TimeAdvanced {
            remaining: std::time::Duration::from_secs(1),
        })
        .is_none());
        assert!(describe(&Event::AgentMoved {
            kind: AgentKind::Prey,
            from: TileCoord::new(0, 0),
            to: TileCoord::new(1, 0),
        })
        .is_none());
    }

    #[test]
    fn game_end_lines_name_the_winner() {
        let line = describe(&Event::GameEnded {
            outcome: Outcome::PreyEaten,
        })
        .expect("terminal events always produce a line");
        assert!(line.contains("ambusher"));
    }

    #[test]
    fn frames_carry_one_grid_row_per_line_plus_the_hud() {
        let mut session = Session::new(11);
        let mut events = Vec::new();
        apply(
            &mut session,
            Command::SelectAgent {
                kind: AgentKind::Prey,
            },
            &mut events,
        );

        let frame = render(&session);
        let grid = query::terrain(&session).expect("round started");
        assert_eq!(frame.lines().count() as u32, grid.rows() + 1);
        assert!(frame.contains('P'));
        assert!(frame.contains('H'));
        assert!(frame.contains('~'));
        assert!(frame.ends_with(&format!(
            "| {}",
            query::hud(&session).message
        )));
    }

    #[test]
    fn the_submerged_ambusher_is_never_drawn() {
        let mut session = Session::new(11);
        let mut events = Vec::new();
        apply(
            &mut session,
            Command::SelectAgent {
                kind: AgentKind::Prey,
            },
            &mut events,
        );

        let agents = query::agents(&session);
        assert!(!agents[2].visible);
        assert!(!render(&session).contains('A'));
    }
}
