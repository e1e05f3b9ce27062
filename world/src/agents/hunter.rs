//! Hunter policy: pursue the prey on sight, drift otherwise.

use rand_chacha::ChaCha8Rng;
use river_chase_core::{AgentKind, Capabilities, TileCoord};

use crate::agents::{self, Agent, Mover};
use crate::pathing;
use crate::terrain::Grid;

/// Manhattan distance at which the hunter notices the prey.
const SIGHT_RANGE: u32 = 7;

/// Autonomous hunter: a swim-capable pursuer.
#[derive(Clone, Debug)]
pub(crate) struct Hunter {
    pub(crate) mover: Mover,
}

impl Hunter {
    pub(crate) fn new(tile: TileCoord) -> Self {
        let capabilities = Capabilities::none().with_swim().with_hunt();
        Self {
            mover: Mover::new(Agent::new(AgentKind::Hunter, tile, capabilities)),
        }
    }

    /// One decision turn. Returns the tile to commit, or `None` when the
    /// hunter rests, stalls, or has nothing to chase.
    pub(crate) fn decide(
        &mut self,
        grid: &Grid,
        prey: &Agent,
        rng: &mut ChaCha8Rng,
    ) -> Option<TileCoord> {
        if !self.mover.agent.alive || !prey.alive {
            return None;
        }
        if !self.mover.ready_to_act() {
            return None;
        }

        let here = self.mover.agent.tile;
        let candidate = if here.manhattan_distance(prey.tile) <= SIGHT_RANGE {
            let step = pathing::next_step(grid, self.mover.agent.capabilities, here, prey.tile);
            (step != here).then_some(step)
        } else {
            agents::wander(grid, self.mover.agent.capabilities, here, rng)
        };

        // A turn with no viable step still runs through the mover so the
        // stall tally advances and the escape diversion can fire.
        let next = candidate.unwrap_or(here);
        let committed = self.mover.step_toward(grid, next, rng);
        self.mover.rest();
        committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use river_chase_core::TileKind;

    fn open_grid() -> Grid {
        Grid::from_kinds(10, 10, vec![TileKind::Land; 100])
    }

    fn prey_at(tile: TileCoord) -> Agent {
        Agent::new(AgentKind::Prey, tile, Capabilities::none().with_swim())
    }

    #[test]
    fn pursues_prey_within_sight_range() {
        let grid = open_grid();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut hunter = Hunter::new(TileCoord::new(0, 0));
        let prey = prey_at(TileCoord::new(4, 0));

        let step = hunter.decide(&grid, &prey, &mut rng);
        assert_eq!(step, Some(TileCoord::new(1, 0)));
    }

    #[test]
    fn drifts_when_prey_is_out_of_sight() {
        let grid = open_grid();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut hunter = Hunter::new(TileCoord::new(0, 0));
        let prey = prey_at(TileCoord::new(9, 9));

        let step = hunter.decide(&grid, &prey, &mut rng);
        let moved = step.expect("open grid always offers a drift step");
        assert_eq!(TileCoord::new(0, 0).manhattan_distance(moved), 1);
    }

    #[test]
    fn rests_for_two_ticks_after_acting() {
        let grid = open_grid();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut hunter = Hunter::new(TileCoord::new(0, 0));
        let prey = prey_at(TileCoord::new(4, 0));

        assert!(hunter.decide(&grid, &prey, &mut rng).is_some());
        assert_eq!(hunter.decide(&grid, &prey, &mut rng), None);
        assert_eq!(hunter.decide(&grid, &prey, &mut rng), None);
        assert!(hunter.decide(&grid, &prey, &mut rng).is_some());
    }

    #[test]
    fn ignores_a_dead_prey() {
        let grid = open_grid();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut hunter = Hunter::new(TileCoord::new(0, 0));
        let mut prey = prey_at(TileCoord::new(2, 0));
        prey.alive = false;

        assert_eq!(hunter.decide(&grid, &prey, &mut rng), None);
    }
}
