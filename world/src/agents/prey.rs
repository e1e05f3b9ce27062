//! Prey policy: flee nearby threats, otherwise gather coins.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use river_chase_core::{AgentKind, Capabilities, TileCoord};

use crate::agents::{self, Agent, Mover};
use crate::pathing;
use crate::terrain::Grid;

/// Manhattan distance at which the prey starts fleeing a threat.
const THREAT_RANGE: u32 = 5;

/// Autonomous prey: a swim-capable coin gatherer.
#[derive(Clone, Debug)]
pub(crate) struct Prey {
    pub(crate) mover: Mover,
}

impl Prey {
    pub(crate) fn new(tile: TileCoord) -> Self {
        let capabilities = Capabilities::none().with_swim().with_evade();
        Self {
            mover: Mover::new(Agent::new(AgentKind::Prey, tile, capabilities)),
        }
    }

    /// One decision turn: flee the nearest threat inside the threat range,
    /// else head for the nearest coin, else drift.
    pub(crate) fn decide(
        &mut self,
        grid: &Grid,
        hunter: &Agent,
        ambusher_visible_at: Option<TileCoord>,
        coins: &[TileCoord],
        rng: &mut ChaCha8Rng,
    ) -> Option<TileCoord> {
        if !self.mover.agent.alive {
            return None;
        }
        if !self.mover.ready_to_act() {
            return None;
        }

        let here = self.mover.agent.tile;
        let threat = nearest_threat(here, hunter, ambusher_visible_at);

        let candidate = match threat {
            Some(threat_tile) => flee_step(grid, self.mover.agent.capabilities, here, threat_tile, rng),
            None => match nearest_coin(here, coins) {
                Some(coin) => {
                    let step = pathing::next_step(grid, self.mover.agent.capabilities, here, coin);
                    (step != here).then_some(step)
                }
                None => agents::wander(grid, self.mover.agent.capabilities, here, rng),
            },
        };

        // A turn with no viable step still runs through the mover so the
        // stall tally advances and the escape diversion can fire.
        let next = candidate.unwrap_or(here);
        let committed = self.mover.step_toward(grid, next, rng);
        self.mover.rest();
        committed
    }
}

/// Nearest threat within the threat range: the living hunter, and the
/// ambusher while it is surfaced.
fn nearest_threat(
    here: TileCoord,
    hunter: &Agent,
    ambusher_visible_at: Option<TileCoord>,
) -> Option<TileCoord> {
    let mut nearest: Option<TileCoord> = None;
    let mut best = u32::MAX;

    if hunter.alive {
        let distance = here.manhattan_distance(hunter.tile);
        if distance <= THREAT_RANGE {
            nearest = Some(hunter.tile);
            best = distance;
        }
    }
    if let Some(ambusher_tile) = ambusher_visible_at {
        let distance = here.manhattan_distance(ambusher_tile);
        if distance <= THREAT_RANGE && distance < best {
            nearest = Some(ambusher_tile);
        }
    }

    nearest
}

/// Picks the enterable neighbor that strictly increases distance from the
/// threat the most, shuffling first so ties break randomly. Holds position
/// when no neighbor improves on standing still.
fn flee_step(
    grid: &Grid,
    capabilities: Capabilities,
    here: TileCoord,
    threat: TileCoord,
    rng: &mut ChaCha8Rng,
) -> Option<TileCoord> {
    let mut options: Vec<TileCoord> = grid.neighbors(here).collect();
    options.shuffle(rng);

    let mut best_tile = None;
    let mut best_distance = here.manhattan_distance(threat);
    for option in options {
        if grid.is_blocked_for(capabilities, option) {
            continue;
        }
        let distance = option.manhattan_distance(threat);
        if distance > best_distance {
            best_distance = distance;
            best_tile = Some(option);
        }
    }

    best_tile
}

/// Nearest coin by Manhattan distance; the earliest-spawned coin wins ties.
fn nearest_coin(here: TileCoord, coins: &[TileCoord]) -> Option<TileCoord> {
    let mut nearest = None;
    let mut best = u32::MAX;
    for coin in coins {
        let distance = here.manhattan_distance(*coin);
        if distance < best {
            best = distance;
            nearest = Some(*coin);
        }
    }
    nearest
}
