//! Agent bodies and the shared movement pacing machinery.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use river_chase_core::{AgentKind, Capabilities, TileCoord};

use crate::pathing;
use crate::terrain::Grid;

pub(crate) mod ambusher;
pub(crate) mod hunter;
pub(crate) mod prey;

/// Ticks an agent rests after acting.
pub(crate) const MOVE_DELAY: u8 = 2;
/// Consecutive stationary attempts before the stuck-escape diversion fires.
pub(crate) const MAX_STUCK: u32 = 6;

/// Physical state shared by every agent: position, life, bite tally and
/// terrain capabilities.
#[derive(Clone, Debug)]
pub(crate) struct Agent {
    pub(crate) kind: AgentKind,
    pub(crate) tile: TileCoord,
    pub(crate) alive: bool,
    pub(crate) bites: u8,
    pub(crate) capabilities: Capabilities,
}

impl Agent {
    pub(crate) fn new(kind: AgentKind, tile: TileCoord, capabilities: Capabilities) -> Self {
        Self {
            kind,
            tile,
            alive: true,
            bites: 0,
            capabilities,
        }
    }

    /// Records one bite. The second bite is fatal; bites on the dead are
    /// ignored and the tally never moves past the fatal count.
    pub(crate) fn on_bitten(&mut self) {
        if !self.alive || self.bites >= 2 {
            return;
        }
        self.bites += 1;
        if self.bites >= 2 {
            self.alive = false;
        }
    }

    /// Extra ticks a river entry costs on top of the normal pace. Healthy
    /// agents swim at full speed; a bitten agent wades.
    pub(crate) fn swim_delay_ticks(&self) -> u8 {
        if self.bites >= 1 {
            1
        } else {
            0
        }
    }
}

/// An agent body paired with the pacing counters every walking agent
/// shares: the rest cooldown, the swim-entry gate and the stuck tally.
#[derive(Clone, Debug)]
pub(crate) struct Mover {
    pub(crate) agent: Agent,
    cooldown: u8,
    swim_tick: u8,
    pub(crate) stuck_ticks: u32,
}

impl Mover {
    pub(crate) fn new(agent: Agent) -> Self {
        Self {
            agent,
            cooldown: 0,
            swim_tick: 0,
            stuck_ticks: 0,
        }
    }

    /// Consumes one tick of rest. Returns `true` when the agent may act
    /// this tick.
    pub(crate) fn ready_to_act(&mut self) -> bool {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return false;
        }
        true
    }

    /// Starts the post-action rest period.
    pub(crate) fn rest(&mut self) {
        self.cooldown = MOVE_DELAY;
    }

    /// Advances the swim gate for a pending river entry. Returns `true`
    /// when the entry may proceed this tick. Land moves always pass and
    /// leave the gate untouched.
    fn clears_swim_gate(&mut self, grid: &Grid, next: TileCoord) -> bool {
        if !grid.is_river(next) {
            return true;
        }
        let period = self.agent.swim_delay_ticks() + 1;
        self.swim_tick = (self.swim_tick + 1) % period;
        self.swim_tick == 0
    }

    /// Attempts to move the agent one tile toward `next`, applying the swim
    /// gate and the stuck-escape diversion. Returns the destination to
    /// commit, or `None` when the agent holds position this tick.
    ///
    /// The body's tile is NOT mutated here; the orchestrator commits the
    /// returned tile so it can emit the movement event from one place.
    pub(crate) fn step_toward(
        &mut self,
        grid: &Grid,
        next: TileCoord,
        rng: &mut ChaCha8Rng,
    ) -> Option<TileCoord> {
        if !self.clears_swim_gate(grid, next) {
            return None;
        }

        let landed = if grid.is_blocked_for(self.agent.capabilities, next) {
            self.agent.tile
        } else {
            next
        };

        if landed == self.agent.tile {
            self.stuck_ticks += 1;
            if self.stuck_ticks >= MAX_STUCK {
                self.stuck_ticks = 0;
                if let Some(diversion) = grid.random_open_land_tile(self.agent.capabilities, rng) {
                    let escape =
                        pathing::next_step(grid, self.agent.capabilities, self.agent.tile, diversion);
                    if escape != self.agent.tile {
                        return Some(escape);
                    }
                }
            }
            return None;
        }

        self.stuck_ticks = 0;
        Some(landed)
    }
}

/// Random drift: shuffles the neighbors of `from` and returns the first
/// one the capability set may enter.
pub(crate) fn wander(
    grid: &Grid,
    capabilities: Capabilities,
    from: TileCoord,
    rng: &mut ChaCha8Rng,
) -> Option<TileCoord> {
    let mut options: Vec<TileCoord> = grid.neighbors(from).collect();
    options.shuffle(rng);
    options
        .into_iter()
        .find(|tile| !grid.is_blocked_for(capabilities, *tile))
}
