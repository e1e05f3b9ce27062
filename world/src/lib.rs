#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for River Chase.
//!
//! The session owns the terrain grid, the three agents, the coin field and
//! the round economy. External surfaces submit [`Command`]s through
//! [`apply`] and observe the outcome through the emitted [`Event`]s and the
//! read-only [`query`] module; nothing else mutates the state.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use river_chase_core::{
    AgentKind, Capabilities, Command, Event, Outcome, Phase, SelectionError, TileCoord,
};

use crate::agents::ambusher::Ambusher;
use crate::agents::hunter::Hunter;
use crate::agents::prey::Prey;
use crate::agents::Mover;
use crate::terrain::Grid;

mod agents;
pub mod pathing;
pub mod terrain;

/// Simulation step length.
pub const TICK: Duration = Duration::from_millis(120);
/// Round time budget.
pub const START_TIME: Duration = Duration::from_secs(60);
/// Coins either collector needs to win outright.
pub const COIN_GOAL: u32 = 10;

const GRID_COLUMNS: u32 = 20;
const GRID_ROWS: u32 = 20;
const COIN_COUNT: usize = 22;
const COIN_SPAWN_ATTEMPTS: u32 = 800;
const CONTROLLED_SPAWN: TileCoord = TileCoord::new(15, 12);
const RIVAL_SPAWN: TileCoord = TileCoord::new(2, 2);

const RACE_MESSAGE: &str = "Race! First to collect 10 coins wins.";
const SELECT_MESSAGE: &str = "Choose Hunter or Prey to start.";

/// Authoritative session: phase machine, current round and persistent
/// high score, plus the seeded random source every stochastic decision
/// draws from.
#[derive(Debug)]
pub struct Session {
    phase: Phase,
    controlled: Option<AgentKind>,
    round: Option<Round>,
    pending_input: Option<(i8, i8)>,
    high_score: u32,
    rng: ChaCha8Rng,
}

impl Session {
    /// Creates a fresh session. Every random draw in the session's
    /// lifetime derives from `seed`, so identical seeds and identical
    /// command sequences replay identically.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            phase: Phase::NotStarted,
            controlled: None,
            round: None,
            pending_input: None,
            high_score: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

/// One round in flight: terrain, agents, coins and the scalar economy.
#[derive(Debug)]
struct Round {
    grid: Grid,
    hunter: Hunter,
    prey: Prey,
    ambusher: Ambusher,
    coins: Vec<TileCoord>,
    prey_coins: u32,
    hunter_coins: u32,
    time_remaining: Duration,
    score: u32,
    message: String,
}

/// Applies a command to the session, appending every resulting event to
/// `events` in the order the state changed.
pub fn apply(session: &mut Session, command: Command, events: &mut Vec<Event>) {
    match command {
        Command::SelectAgent { kind } => select_agent(session, kind, events),
        Command::SetDirectionalInput { dx, dy } => {
            if (-1..=1).contains(&dx) && (-1..=1).contains(&dy) {
                session.pending_input = Some((dx, dy));
            }
        }
        Command::Tick => tick(session, events),
        Command::TogglePause => toggle_pause(session, events),
        Command::Reset => reset(session, events),
    }
}

fn select_agent(session: &mut Session, kind: AgentKind, events: &mut Vec<Event>) {
    if kind == AgentKind::Ambusher {
        events.push(Event::SelectionRejected {
            kind,
            reason: SelectionError::NotSelectable,
        });
        return;
    }
    if !matches!(session.phase, Phase::NotStarted | Phase::Selecting) {
        events.push(Event::SelectionRejected {
            kind,
            reason: SelectionError::SessionInProgress,
        });
        return;
    }

    let (hunter_spawn, prey_spawn) = match kind {
        AgentKind::Hunter => (CONTROLLED_SPAWN, RIVAL_SPAWN),
        _ => (RIVAL_SPAWN, CONTROLLED_SPAWN),
    };

    let grid = Grid::generate(GRID_COLUMNS, GRID_ROWS, &mut session.rng);
    let hunter = Hunter::new(hunter_spawn);
    let prey = Prey::new(prey_spawn);
    let ambusher = Ambusher::new(grid.first_river_tile_or_center(), &mut session.rng);
    let coins = spawn_coins(
        &grid,
        &[hunter_spawn, prey_spawn, ambusher.agent.tile],
        &mut session.rng,
    );

    session.round = Some(Round {
        grid,
        hunter,
        prey,
        ambusher,
        coins,
        prey_coins: 0,
        hunter_coins: 0,
        time_remaining: START_TIME,
        score: 0,
        message: RACE_MESSAGE.to_owned(),
    });
    session.controlled = Some(kind);
    session.pending_input = None;
    session.phase = Phase::Running;
    events.push(Event::SessionStarted { controlled: kind });
}

/// Scatters coins over tiles the prey could stand on, skipping agent
/// spawns and duplicates. Placement gives up after a bounded number of
/// attempts, so a hostile grid yields fewer coins rather than a hang.
fn spawn_coins(grid: &Grid, occupied: &[TileCoord], rng: &mut ChaCha8Rng) -> Vec<TileCoord> {
    let prey_reach = Capabilities::none().with_swim().with_evade();
    let mut coins = Vec::with_capacity(COIN_COUNT);
    let mut attempts = 0;

    while coins.len() < COIN_COUNT && attempts < COIN_SPAWN_ATTEMPTS {
        attempts += 1;
        let tile = TileCoord::new(
            rng.gen_range(0..grid.columns()),
            rng.gen_range(0..grid.rows()),
        );
        if grid.is_blocked_for(prey_reach, tile) {
            continue;
        }
        if occupied.contains(&tile) || coins.contains(&tile) {
            continue;
        }
        coins.push(tile);
    }

    coins
}

fn toggle_pause(session: &mut Session, events: &mut Vec<Event>) {
    match session.phase {
        Phase::Running => {
            session.phase = Phase::Paused;
            events.push(Event::PauseToggled { paused: true });
        }
        Phase::Paused => {
            session.phase = Phase::Running;
            events.push(Event::PauseToggled { paused: false });
        }
        _ => {}
    }
}

fn reset(session: &mut Session, events: &mut Vec<Event>) {
    if let Some(round) = session.round.take() {
        session.high_score = session.high_score.max(round.score);
    }
    session.controlled = None;
    session.pending_input = None;
    session.phase = Phase::Selecting;
    events.push(Event::SessionReset);
}

fn tick(session: &mut Session, events: &mut Vec<Event>) {
    if session.phase != Phase::Running {
        return;
    }
    let input = session.pending_input.take();
    let controlled = session.controlled;

    let Session {
        phase,
        round,
        high_score,
        rng,
        ..
    } = session;
    let Some(round) = round.as_mut() else {
        return;
    };
    let Round {
        grid,
        hunter,
        prey,
        ambusher,
        coins,
        prey_coins,
        hunter_coins,
        time_remaining,
        score,
        message,
    } = round;

    *time_remaining = time_remaining.saturating_sub(TICK);
    events.push(Event::TimeAdvanced {
        remaining: *time_remaining,
    });

    // Hunter turn.
    let hunter_step = if controlled == Some(AgentKind::Hunter) {
        directed_step(grid, &mut hunter.mover, input, rng)
    } else {
        hunter.decide(grid, &prey.mover.agent, rng)
    };
    commit_move(&mut hunter.mover, hunter_step, AgentKind::Hunter, events);
    if caught(hunter, prey) {
        prey.mover.agent.alive = false;
        end_round(Outcome::PreyCaught, message, *score, high_score, phase, events);
        return;
    }

    // Prey turn.
    let ambusher_visible_at = ambusher.is_visible().then_some(ambusher.agent.tile);
    let prey_step = if controlled == Some(AgentKind::Prey) {
        directed_step(grid, &mut prey.mover, input, rng)
    } else {
        prey.decide(grid, &hunter.mover.agent, ambusher_visible_at, coins, rng)
    };
    commit_move(&mut prey.mover, prey_step, AgentKind::Prey, events);
    if caught(hunter, prey) {
        prey.mover.agent.alive = false;
        end_round(Outcome::PreyCaught, message, *score, high_score, phase, events);
        return;
    }

    // Ambusher turn.
    let visible_before = ambusher.is_visible();
    if let Some(to) = ambusher.decide(grid, &hunter.mover.agent, &prey.mover.agent, rng) {
        let from = ambusher.agent.tile;
        ambusher.agent.tile = to;
        events.push(Event::AgentMoved {
            kind: AgentKind::Ambusher,
            from,
            to,
        });
    }
    if ambusher.is_visible() && ambusher.agent.alive {
        // Both swimmers are checked every turn; the ambusher retreats once
        // if anything was struck.
        let at = ambusher.agent.tile;
        let prey_struck = resolve_bite(grid, at, &mut prey.mover.agent, AgentKind::Prey, events);
        let hunter_struck =
            resolve_bite(grid, at, &mut hunter.mover.agent, AgentKind::Hunter, events);
        if prey_struck || hunter_struck {
            ambusher.retreat(rng);
        }
    }
    if !visible_before && ambusher.is_visible() {
        events.push(Event::AmbusherSurfaced {
            at: ambusher.agent.tile,
        });
    }
    if visible_before && !ambusher.is_visible() {
        events.push(Event::AmbusherSubmerged);
    }
    if !prey.mover.agent.alive {
        end_round(Outcome::PreyEaten, message, *score, high_score, phase, events);
        return;
    }

    // Coin pickups: the prey's pickup resolves first on shared tiles.
    if prey.mover.agent.alive {
        if let Some(index) = coins.iter().position(|coin| *coin == prey.mover.agent.tile) {
            let tile = coins.remove(index);
            *prey_coins += 1;
            *score += 10;
            events.push(Event::CoinCollected {
                kind: AgentKind::Prey,
                tile,
            });
        }
    }
    if hunter.mover.agent.alive {
        if let Some(index) = coins.iter().position(|coin| *coin == hunter.mover.agent.tile) {
            let tile = coins.remove(index);
            *hunter_coins += 1;
            events.push(Event::CoinCollected {
                kind: AgentKind::Hunter,
                tile,
            });
        }
    }

    // Outcome checks, in fixed priority.
    if *prey_coins >= COIN_GOAL {
        end_round(Outcome::PreyCoinGoal, message, *score, high_score, phase, events);
        return;
    }
    if *hunter_coins >= COIN_GOAL {
        end_round(Outcome::HunterCoinGoal, message, *score, high_score, phase, events);
        return;
    }
    if time_remaining.is_zero() {
        end_round(
            Outcome::TimeExpired {
                prey_coins: *prey_coins,
                hunter_coins: *hunter_coins,
            },
            message,
            *score,
            high_score,
            phase,
            events,
        );
        return;
    }

    // Survival trickle.
    *score += 1;
}

/// Resolves the player's buffered directional input into a movement
/// attempt. A zero vector and off-grid destinations are ignored.
fn directed_step(
    grid: &Grid,
    mover: &mut Mover,
    input: Option<(i8, i8)>,
    rng: &mut ChaCha8Rng,
) -> Option<TileCoord> {
    let (dx, dy) = input?;
    if dx == 0 && dy == 0 {
        return None;
    }
    let next = mover.agent.tile.offset_by(dx, dy)?;
    if !grid.contains(next) {
        return None;
    }
    mover.step_toward(grid, next, rng)
}

fn commit_move(mover: &mut Mover, step: Option<TileCoord>, kind: AgentKind, events: &mut Vec<Event>) {
    if let Some(to) = step {
        let from = mover.agent.tile;
        mover.agent.tile = to;
        events.push(Event::AgentMoved { kind, from, to });
    }
}

fn caught(hunter: &Hunter, prey: &Prey) -> bool {
    hunter.mover.agent.alive
        && prey.mover.agent.alive
        && hunter.mover.agent.tile == prey.mover.agent.tile
}

/// Applies one strike if the target shares the ambusher's river tile.
/// A landed bite shoves the target to the nearest shore tile.
fn resolve_bite(
    grid: &Grid,
    ambush_tile: TileCoord,
    target: &mut agents::Agent,
    kind: AgentKind,
    events: &mut Vec<Event>,
) -> bool {
    if !target.alive
        || !target.capabilities.can_swim()
        || target.tile != ambush_tile
        || !grid.is_river(target.tile)
    {
        return false;
    }

    target.on_bitten();
    events.push(Event::AgentBitten {
        kind,
        bites: target.bites,
    });

    let shore = grid
        .neighbors(target.tile)
        .find(|tile| !grid.is_river(*tile) && !grid.is_blocked_for(target.capabilities, *tile));
    if let Some(to) = shore {
        let from = target.tile;
        target.tile = to;
        events.push(Event::AgentMoved { kind, from, to });
    }

    true
}

fn end_round(
    outcome: Outcome,
    message: &mut String,
    score: u32,
    high_score: &mut u32,
    phase: &mut Phase,
    events: &mut Vec<Event>,
) {
    *message = outcome_message(&outcome);
    *phase = Phase::Over;
    *high_score = (*high_score).max(score);
    events.push(Event::GameEnded { outcome });
}

fn outcome_message(outcome: &Outcome) -> String {
    match outcome {
        Outcome::PreyCoinGoal => "Prey wins! Collected 10 coins first.".to_owned(),
        Outcome::HunterCoinGoal => "Hunter wins! Collected 10 coins first.".to_owned(),
        Outcome::TimeExpired {
            prey_coins,
            hunter_coins,
        } => format!("Time up! Prey {prey_coins} vs Hunter {hunter_coins} coins."),
        Outcome::PreyCaught => "Hunter wins! Caught the prey.".to_owned(),
        Outcome::PreyEaten => "Ambusher wins! The prey was bitten twice.".to_owned(),
    }
}

/// Read-only projections of session state for external surfaces.
pub mod query {
    use std::time::Duration;

    use river_chase_core::{AgentKind, AgentSnapshot, HudSnapshot, Phase, TileCoord};

    use crate::terrain::Grid;
    use crate::{Session, COIN_GOAL, SELECT_MESSAGE, START_TIME};

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(session: &Session) -> Phase {
        session.phase
    }

    /// Which agent the player controls, once a round has started.
    #[must_use]
    pub fn controlled_agent(session: &Session) -> Option<AgentKind> {
        session.controlled
    }

    /// Terrain of the round in flight.
    #[must_use]
    pub fn terrain(session: &Session) -> Option<&Grid> {
        session.round.as_ref().map(|round| &round.grid)
    }

    /// Remaining coins on the field.
    #[must_use]
    pub fn coins(session: &Session) -> &[TileCoord] {
        session
            .round
            .as_ref()
            .map_or(&[], |round| round.coins.as_slice())
    }

    /// Snapshots of the three agents in fixed hunter, prey, ambusher
    /// order. Empty before a round starts.
    #[must_use]
    pub fn agents(session: &Session) -> Vec<AgentSnapshot> {
        let Some(round) = session.round.as_ref() else {
            return Vec::new();
        };

        let hunter = &round.hunter.mover.agent;
        let prey = &round.prey.mover.agent;
        let ambusher = &round.ambusher.agent;
        vec![
            AgentSnapshot {
                kind: hunter.kind,
                tile: hunter.tile,
                alive: hunter.alive,
                bites: hunter.bites,
                visible: true,
            },
            AgentSnapshot {
                kind: prey.kind,
                tile: prey.tile,
                alive: prey.alive,
                bites: prey.bites,
                visible: true,
            },
            AgentSnapshot {
                kind: ambusher.kind,
                tile: ambusher.tile,
                alive: ambusher.alive,
                bites: ambusher.bites,
                visible: round.ambusher.is_visible(),
            },
        ]
    }

    /// Scoreboard projection for rendering.
    #[must_use]
    pub fn hud(session: &Session) -> HudSnapshot {
        let Some(round) = session.round.as_ref() else {
            return HudSnapshot {
                prey_coins: 0,
                hunter_coins: 0,
                coin_goal: COIN_GOAL,
                time_remaining: START_TIME,
                score: 0,
                high_score: session.high_score,
                paused: false,
                game_over: false,
                message: SELECT_MESSAGE.to_owned(),
            };
        };

        HudSnapshot {
            prey_coins: round.prey_coins,
            hunter_coins: round.hunter_coins,
            coin_goal: COIN_GOAL,
            time_remaining: round.time_remaining,
            score: round.score,
            high_score: session.high_score,
            paused: session.phase == Phase::Paused,
            game_over: session.phase == Phase::Over,
            message: round.message.clone(),
        }
    }

    /// Seconds left on the round clock, rounded up.
    #[must_use]
    pub fn seconds_remaining(session: &Session) -> u64 {
        let remaining = session
            .round
            .as_ref()
            .map_or(START_TIME, |round| round.time_remaining);
        duration_ceil_secs(remaining)
    }

    fn duration_ceil_secs(duration: Duration) -> u64 {
        let secs = duration.as_secs();
        if duration.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Fixture hooks for scenario tests: deterministic round construction and
/// probes into pacing state that the public surface deliberately hides.
#[cfg(feature = "scenario_scaffolding")]
pub mod scaffold {
    use std::time::Duration;

    use river_chase_core::{AgentKind, Phase, TileCoord, TileKind};

    use crate::agents::ambusher::{Ambusher, STEP_EVERY};
    use crate::agents::hunter::Hunter;
    use crate::agents::prey::Prey;
    use crate::terrain::Grid;
    use crate::{Round, Session, RACE_MESSAGE, START_TIME};

    /// Builds a grid from glyph rows: `.` land, `~` river, `#` obstacle.
    #[must_use]
    pub fn grid_from_rows(rows: &[&str]) -> Grid {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |row| row.len()) as u32;
        let mut kinds = Vec::with_capacity((width * height) as usize);
        for row in rows {
            for glyph in row.chars() {
                kinds.push(match glyph {
                    '~' => TileKind::River,
                    '#' => TileKind::Obstacle,
                    _ => TileKind::Land,
                });
            }
        }
        Grid::from_kinds(width, height, kinds)
    }

    /// Starts a running round on an explicit grid with explicit agent
    /// positions and no coins.
    pub fn begin_round(
        session: &mut Session,
        controlled: AgentKind,
        grid: Grid,
        hunter_at: TileCoord,
        prey_at: TileCoord,
        ambusher_at: TileCoord,
    ) {
        let ambusher = Ambusher::new(ambusher_at, &mut session.rng);
        session.round = Some(Round {
            grid,
            hunter: Hunter::new(hunter_at),
            prey: Prey::new(prey_at),
            ambusher,
            coins: Vec::new(),
            prey_coins: 0,
            hunter_coins: 0,
            time_remaining: START_TIME,
            score: 0,
            message: RACE_MESSAGE.to_owned(),
        });
        session.controlled = Some(controlled);
        session.pending_input = None;
        session.phase = Phase::Running;
    }

    /// Replaces the coin field.
    pub fn set_coins(session: &mut Session, coins: Vec<TileCoord>) {
        if let Some(round) = session.round.as_mut() {
            round.coins = coins;
        }
    }

    /// Overrides the round clock.
    pub fn set_time_remaining(session: &mut Session, remaining: Duration) {
        if let Some(round) = session.round.as_mut() {
            round.time_remaining = remaining;
        }
    }

    /// Overrides both coin tallies.
    pub fn set_coin_counts(session: &mut Session, prey_coins: u32, hunter_coins: u32) {
        if let Some(round) = session.round.as_mut() {
            round.prey_coins = prey_coins;
            round.hunter_coins = hunter_coins;
        }
    }

    /// Forces the ambusher to the surface with a long visibility window,
    /// a primed pacing clock and no strike cooldown, so the next tick's
    /// ambusher turn acts immediately.
    pub fn reveal_ambusher(session: &mut Session, timer: u16) {
        if let Some(round) = session.round.as_mut() {
            round.ambusher.hidden = false;
            round.ambusher.state_timer = timer;
            round.ambusher.step_clock = STEP_EVERY - 1;
            round.ambusher.bite_cooldown = 0;
        }
    }

    /// Whether the ambusher is currently submerged.
    #[must_use]
    pub fn ambusher_hidden(session: &Session) -> bool {
        session
            .round
            .as_ref()
            .map_or(true, |round| !round.ambusher.is_visible())
    }

    /// Stationary-attempt tally for the hunter or prey.
    #[must_use]
    pub fn stuck_ticks(session: &Session, kind: AgentKind) -> u32 {
        let Some(round) = session.round.as_ref() else {
            return 0;
        };
        match kind {
            AgentKind::Hunter => round.hunter.mover.stuck_ticks,
            AgentKind::Prey => round.prey.mover.stuck_ticks,
            AgentKind::Ambusher => 0,
        }
    }
}
