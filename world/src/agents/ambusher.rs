//! Ambusher policy: a river-bound lurker that surfaces near swimmers,
//! bursts toward them, and submerges again after striking.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use river_chase_core::{AgentKind, Capabilities, TileCoord};

use crate::agents::Agent;
use crate::pathing;
use crate::terrain::Grid;

/// Manhattan distance at which a swimmer in the river wakes the ambusher.
const ALERT_RANGE: u32 = 5;
/// River tiles covered per burst while chasing a swimmer.
const CHASE_HOPS: u32 = 3;
/// River tiles covered per burst while roaming.
const ROAM_HOPS: u32 = 2;
/// Action turns between bursts.
pub(crate) const STEP_EVERY: u8 = 2;
/// Action turns spent submerged after landing a bite.
const BITE_COOLDOWN: u8 = 6;
/// Ticks spent hidden before the dormancy timer is resampled.
const HIDDEN_TICKS: std::ops::RangeInclusive<u16> = 40..=80;
/// Ticks spent surfaced before submerging again.
const VISIBLE_TICKS: std::ops::RangeInclusive<u16> = 50..=90;

/// Autonomous river ambusher.
#[derive(Clone, Debug)]
pub(crate) struct Ambusher {
    pub(crate) agent: Agent,
    pub(crate) hidden: bool,
    pub(crate) state_timer: u16,
    pub(crate) bite_cooldown: u8,
    pub(crate) step_clock: u8,
    roam_target: Option<TileCoord>,
}

impl Ambusher {
    pub(crate) fn new(tile: TileCoord, rng: &mut ChaCha8Rng) -> Self {
        let capabilities = Capabilities::none().with_swim().with_hunt();
        Self {
            agent: Agent::new(AgentKind::Ambusher, tile, capabilities),
            hidden: true,
            state_timer: rng.gen_range(HIDDEN_TICKS),
            bite_cooldown: 0,
            step_clock: 0,
            roam_target: None,
        }
    }

    /// Whether the ambusher is currently surfaced.
    pub(crate) fn is_visible(&self) -> bool {
        !self.hidden
    }

    /// Submerges after a landed bite and starts the strike cooldown.
    pub(crate) fn retreat(&mut self, rng: &mut ChaCha8Rng) {
        self.bite_cooldown = BITE_COOLDOWN;
        self.hidden = true;
        self.state_timer = rng.gen_range(HIDDEN_TICKS);
        self.roam_target = None;
    }

    /// One decision turn. Returns the river tile to commit, or `None` when
    /// the ambusher stays where it is (hidden, cooling down, pacing, or
    /// simply out of river to move through).
    pub(crate) fn decide(
        &mut self,
        grid: &Grid,
        hunter: &Agent,
        prey: &Agent,
        rng: &mut ChaCha8Rng,
    ) -> Option<TileCoord> {
        if !self.agent.alive {
            return None;
        }
        if self.bite_cooldown > 0 {
            self.bite_cooldown -= 1;
            return None;
        }

        if self.hidden {
            if nearest_swimmer(grid, self.agent.tile, hunter, prey).is_some() {
                self.hidden = false;
                self.state_timer = rng.gen_range(VISIBLE_TICKS);
            } else if self.state_timer > 0 {
                self.state_timer -= 1;
            } else {
                self.state_timer = rng.gen_range(HIDDEN_TICKS);
            }
            return None;
        }

        // The turn whose decrement exhausts the timer submerges without
        // acting.
        self.state_timer = self.state_timer.saturating_sub(1);
        if self.state_timer == 0 {
            self.hidden = true;
            self.state_timer = rng.gen_range(HIDDEN_TICKS);
            return None;
        }

        self.step_clock += 1;
        if self.step_clock < STEP_EVERY {
            return None;
        }
        self.step_clock = 0;

        let committed = match nearest_swimmer(grid, self.agent.tile, hunter, prey) {
            Some(target) => {
                self.roam_target = None;
                self.burst_toward(grid, target, CHASE_HOPS)
            }
            None => {
                let keep = self
                    .roam_target
                    .filter(|tile| grid.is_river(*tile) && *tile != self.agent.tile);
                let target = match keep {
                    Some(tile) => Some(tile),
                    None => grid.random_river_tile(rng),
                };
                self.roam_target = target;
                target.and_then(|tile| self.burst_toward(grid, tile, ROAM_HOPS))
            }
        };

        committed
    }

    /// Advances up to `hops` tiles toward `target`, committing only river
    /// tiles. Stops early at a dead end or the first non-river step.
    fn burst_toward(&self, grid: &Grid, target: TileCoord, hops: u32) -> Option<TileCoord> {
        let mut cursor = self.agent.tile;
        for _ in 0..hops {
            let next = pathing::next_step(grid, self.agent.capabilities, cursor, target);
            if next == cursor || !grid.is_river(next) {
                break;
            }
            cursor = next;
        }
        (cursor != self.agent.tile).then_some(cursor)
    }
}

/// Nearest living swim-capable agent currently in the river within alert
/// range of `from`. The prey is checked first, so the hunter must be
/// strictly closer to displace it.
pub(crate) fn nearest_swimmer(
    grid: &Grid,
    from: TileCoord,
    hunter: &Agent,
    prey: &Agent,
) -> Option<TileCoord> {
    let mut nearest = None;
    let mut best = u32::MAX;

    for agent in [prey, hunter] {
        if !agent.alive || !agent.capabilities.can_swim() || !grid.is_river(agent.tile) {
            continue;
        }
        let distance = from.manhattan_distance(agent.tile);
        if distance <= ALERT_RANGE && distance < best {
            best = distance;
            nearest = Some(agent.tile);
        }
    }

    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use river_chase_core::TileKind;

    // One river column down the middle of a 7x7 board.
    fn river_grid() -> Grid {
        let mut kinds = vec![TileKind::Land; 49];
        for row in 0..7 {
            kinds[row * 7 + 3] = TileKind::River;
        }
        Grid::from_kinds(7, 7, kinds)
    }

    fn swimmer(kind: AgentKind, tile: TileCoord) -> Agent {
        Agent::new(kind, tile, Capabilities::none().with_swim())
    }

    #[test]
    fn surfaces_when_a_swimmer_enters_the_river_nearby() {
        let grid = river_grid();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut ambusher = Ambusher::new(TileCoord::new(3, 0), &mut rng);
        let hunter = swimmer(AgentKind::Hunter, TileCoord::new(0, 6));
        let prey = swimmer(AgentKind::Prey, TileCoord::new(3, 2));

        assert!(!ambusher.is_visible());
        assert_eq!(ambusher.decide(&grid, &hunter, &prey, &mut rng), None);
        assert!(ambusher.is_visible());
    }

    #[test]
    fn stays_hidden_while_swimmers_keep_to_land() {
        let grid = river_grid();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut ambusher = Ambusher::new(TileCoord::new(3, 0), &mut rng);
        let hunter = swimmer(AgentKind::Hunter, TileCoord::new(1, 1));
        let prey = swimmer(AgentKind::Prey, TileCoord::new(5, 1));

        for _ in 0..200 {
            assert_eq!(ambusher.decide(&grid, &hunter, &prey, &mut rng), None);
            assert!(!ambusher.is_visible());
        }
    }

    #[test]
    fn burst_stays_on_river_tiles() {
        let grid = river_grid();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut ambusher = Ambusher::new(TileCoord::new(3, 0), &mut rng);
        ambusher.hidden = false;
        ambusher.state_timer = 100;
        ambusher.step_clock = STEP_EVERY - 1;
        let hunter = swimmer(AgentKind::Hunter, TileCoord::new(0, 6));
        let prey = swimmer(AgentKind::Prey, TileCoord::new(3, 4));

        let step = ambusher
            .decide(&grid, &hunter, &prey, &mut rng)
            .expect("clear river lane toward the prey");
        // Three hops down the river column.
        assert_eq!(step, TileCoord::new(3, 3));
        assert!(grid.is_river(step));
    }

    #[test]
    fn paces_every_other_action_turn() {
        let grid = river_grid();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut ambusher = Ambusher::new(TileCoord::new(3, 0), &mut rng);
        ambusher.hidden = false;
        ambusher.state_timer = 100;
        let hunter = swimmer(AgentKind::Hunter, TileCoord::new(0, 6));
        let prey = swimmer(AgentKind::Prey, TileCoord::new(3, 4));

        // Odd turns only wind the pacing clock; bursts land on even turns.
        assert_eq!(ambusher.decide(&grid, &hunter, &prey, &mut rng), None);
        assert!(ambusher.decide(&grid, &hunter, &prey, &mut rng).is_some());
        assert_eq!(ambusher.step_clock, 0);
    }

    #[test]
    fn retreat_submerges_and_blocks_turns() {
        let grid = river_grid();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut ambusher = Ambusher::new(TileCoord::new(3, 3), &mut rng);
        ambusher.hidden = false;
        ambusher.state_timer = 100;
        let hunter = swimmer(AgentKind::Hunter, TileCoord::new(0, 6));
        let prey = swimmer(AgentKind::Prey, TileCoord::new(3, 4));

        ambusher.retreat(&mut rng);
        assert!(!ambusher.is_visible());
        for _ in 0..6 {
            assert_eq!(ambusher.decide(&grid, &hunter, &prey, &mut rng), None);
        }
        // Cooldown spent; the nearby swimmer wakes it on the next turn.
        assert_eq!(ambusher.decide(&grid, &hunter, &prey, &mut rng), None);
        assert!(ambusher.is_visible());
    }

    #[test]
    fn submerges_without_acting_when_the_visible_timer_expires() {
        let grid = river_grid();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut ambusher = Ambusher::new(TileCoord::new(3, 0), &mut rng);
        ambusher.hidden = false;
        ambusher.state_timer = 1;
        ambusher.step_clock = STEP_EVERY - 1;
        let hunter = swimmer(AgentKind::Hunter, TileCoord::new(0, 6));
        let prey = swimmer(AgentKind::Prey, TileCoord::new(3, 2));

        assert_eq!(ambusher.decide(&grid, &hunter, &prey, &mut rng), None);
        assert!(!ambusher.is_visible());
    }

    #[test]
    fn prey_wins_target_ties_over_hunter() {
        let grid = river_grid();
        let from = TileCoord::new(3, 3);
        let hunter = swimmer(AgentKind::Hunter, TileCoord::new(3, 1));
        let prey = swimmer(AgentKind::Prey, TileCoord::new(3, 5));

        assert_eq!(
            nearest_swimmer(&grid, from, &hunter, &prey),
            Some(TileCoord::new(3, 5))
        );
    }

    #[test]
    fn landbound_or_dead_swimmers_are_ignored() {
        let grid = river_grid();
        let from = TileCoord::new(3, 3);
        let hunter = swimmer(AgentKind::Hunter, TileCoord::new(2, 3));
        let mut prey = swimmer(AgentKind::Prey, TileCoord::new(3, 4));
        prey.alive = false;

        assert_eq!(nearest_swimmer(&grid, from, &hunter, &prey), None);
    }
}
