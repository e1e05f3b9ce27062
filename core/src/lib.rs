#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the River Chase engine.
//!
//! This crate defines the message surface that connects adapters and the
//! authoritative session. Adapters submit [`Command`] values describing
//! desired mutations, the session executes those commands via its `apply`
//! entry point, and then broadcasts [`Event`] values describing what
//! happened. Rendering collaborators consume read-only snapshots; nothing
//! in this crate touches graphics or input devices.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to River Chase.";

/// Location of a single grid tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new grid tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Returns the tile displaced by the provided deltas, if it stays at
    /// non-negative coordinates.
    #[must_use]
    pub fn offset_by(self, dx: i8, dy: i8) -> Option<TileCoord> {
        let column = self.column.checked_add_signed(i32::from(dx))?;
        let row = self.row.checked_add_signed(i32::from(dy))?;
        Some(TileCoord::new(column, row))
    }
}

/// Terrain classification of a grid tile governing passability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Open ground that denies no mover.
    Land,
    /// Water that denies movers lacking the swim capability.
    River,
    /// Impassable terrain that denies every mover.
    Obstacle,
}

impl TileKind {
    /// Reports whether this tile kind's rule denies the provided capability
    /// set. The rule is fixed at tile creation and never mutates.
    #[must_use]
    pub const fn denies(self, capabilities: Capabilities) -> bool {
        match self {
            Self::Land => false,
            Self::River => !capabilities.can_swim(),
            Self::Obstacle => true,
        }
    }
}

/// Set of traversal and behavioural abilities an agent possesses.
///
/// Checked by value wherever passability or eligibility is decided; no
/// component inspects an agent's concrete type to answer those questions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities(u8);

impl Capabilities {
    const SWIM: u8 = 1;
    const HUNT: u8 = 1 << 1;
    const EVADE: u8 = 1 << 2;

    /// Creates an empty capability set.
    #[must_use]
    pub const fn none() -> Self {
        Self(0)
    }

    /// Adds the swim capability, allowing traversal of river tiles.
    #[must_use]
    pub const fn with_swim(self) -> Self {
        Self(self.0 | Self::SWIM)
    }

    /// Adds the hunt capability marker.
    #[must_use]
    pub const fn with_hunt(self) -> Self {
        Self(self.0 | Self::HUNT)
    }

    /// Adds the evade capability marker.
    #[must_use]
    pub const fn with_evade(self) -> Self {
        Self(self.0 | Self::EVADE)
    }

    /// Reports whether the set contains the swim capability.
    #[must_use]
    pub const fn can_swim(&self) -> bool {
        self.0 & Self::SWIM != 0
    }

    /// Reports whether the set contains the hunt capability.
    #[must_use]
    pub const fn can_hunt(&self) -> bool {
        self.0 & Self::HUNT != 0
    }

    /// Reports whether the set contains the evade capability.
    #[must_use]
    pub const fn can_evade(&self) -> bool {
        self.0 & Self::EVADE != 0
    }
}

/// Identity of one of the three agents inhabiting a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// The pursuing agent; wins by catching the prey or out-collecting it.
    Hunter,
    /// The fleeing/collecting agent; wins by reaching the coin goal.
    Prey,
    /// The autonomous river ambusher; never player-controlled.
    Ambusher,
}

/// Lifecycle phase of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Freshly constructed session that has never run a round.
    NotStarted,
    /// Awaiting a character selection after a reset.
    Selecting,
    /// A round is in progress and ticks advance the simulation.
    Running,
    /// A round exists but ticks are suspended.
    Paused,
    /// The round ended; only a reset leaves this phase.
    Over,
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Chooses which agent is under external control and starts a round.
    /// Only valid before a round is running; the ambusher is never
    /// selectable.
    SelectAgent {
        /// Agent the operator wishes to control.
        kind: AgentKind,
    },
    /// Queues a directional intent for the controlled agent. Each component
    /// must lie in `-1..=1`; anything else is ignored.
    SetDirectionalInput {
        /// Column delta of the intent.
        dx: i8,
        /// Row delta of the intent.
        dy: i8,
    },
    /// Advances the session by one discrete step. A no-op while paused,
    /// over, or before a round starts.
    Tick,
    /// Suspends or resumes ticking for the current round.
    TogglePause,
    /// Clears the round, folds the score into the high score, and returns
    /// to the selection phase.
    Reset,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a round started with the provided agent under control.
    SessionStarted {
        /// Agent the operator now controls.
        controlled: AgentKind,
    },
    /// Reports that a selection request was refused.
    SelectionRejected {
        /// Agent named in the refused request.
        kind: AgentKind,
        /// Specific reason the selection failed.
        reason: SelectionError,
    },
    /// Indicates that the countdown advanced at the top of a tick.
    TimeAdvanced {
        /// Budget remaining after the decrement, clamped at zero.
        remaining: Duration,
    },
    /// Confirms that an agent occupies a new tile.
    AgentMoved {
        /// Agent that moved.
        kind: AgentKind,
        /// Tile the agent occupied before moving.
        from: TileCoord,
        /// Tile the agent occupies after the move.
        to: TileCoord,
    },
    /// Announces that the ambusher became visible.
    AmbusherSurfaced {
        /// Tile the ambusher surfaced at.
        at: TileCoord,
    },
    /// Announces that the ambusher went back into hiding.
    AmbusherSubmerged,
    /// Confirms that a coin was claimed.
    CoinCollected {
        /// Agent that claimed the coin.
        kind: AgentKind,
        /// Tile the coin occupied.
        tile: TileCoord,
    },
    /// Reports that an agent was bitten by the ambusher.
    AgentBitten {
        /// Agent that received the bite.
        kind: AgentKind,
        /// Wound count after the bite.
        bites: u8,
    },
    /// Announces that the pause state flipped.
    PauseToggled {
        /// Whether the session is paused after the toggle.
        paused: bool,
    },
    /// Confirms that the session returned to the selection phase.
    SessionReset,
    /// Announces that the round ended with the recorded outcome.
    GameEnded {
        /// First win/lose condition that became true, in priority order.
        outcome: Outcome,
    },
}

/// Reasons a selection request may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SelectionError {
    /// The named agent is not offered for external control.
    #[error("the requested agent is not offered for external control")]
    NotSelectable,
    /// A round is already running, paused, or over.
    #[error("a round is already running, paused, or over")]
    SessionInProgress,
}

/// Terminal result of a round, in the orchestrator's priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The prey collected the coin goal first.
    PreyCoinGoal,
    /// The hunter collected the coin goal first.
    HunterCoinGoal,
    /// The time budget ran out. A tie in coin counts is reported as-is,
    /// never adjudicated.
    TimeExpired {
        /// Coins the prey held when time ran out.
        prey_coins: u32,
        /// Coins the hunter held when time ran out.
        hunter_coins: u32,
    },
    /// The hunter caught the prey on its own tile.
    PreyCaught,
    /// The prey took its second bite from the ambusher.
    PreyEaten,
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentSnapshot {
    /// Identity of the agent.
    pub kind: AgentKind,
    /// Tile currently occupied by the agent.
    pub tile: TileCoord,
    /// Whether the agent is still alive.
    pub alive: bool,
    /// Wound count accumulated so far.
    pub bites: u8,
    /// Whether a rendering collaborator should draw the agent. Always true
    /// for the hunter and prey; false for the ambusher while hidden.
    pub visible: bool,
}

/// HUD scalars exposed to the rendering collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudSnapshot {
    /// Coins the prey has collected this round.
    pub prey_coins: u32,
    /// Coins the hunter has collected this round.
    pub hunter_coins: u32,
    /// Coin count that ends the round in the collector's favour.
    pub coin_goal: u32,
    /// Time budget remaining for the round.
    pub time_remaining: Duration,
    /// Running score accumulated this round.
    pub score: u32,
    /// Best score recorded across rounds of this session.
    pub high_score: u32,
    /// Whether ticking is currently suspended.
    pub paused: bool,
    /// Whether the round has ended.
    pub game_over: bool,
    /// Human-readable status line for the HUD.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::{AgentKind, Capabilities, Outcome, SelectionError, TileCoord, TileKind};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = TileCoord::new(1, 1);
        let destination = TileCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn offset_rejects_negative_coordinates() {
        let origin = TileCoord::new(0, 3);
        assert_eq!(origin.offset_by(-1, 0), None);
        assert_eq!(origin.offset_by(1, -1), Some(TileCoord::new(1, 2)));
    }

    #[test]
    fn passability_depends_only_on_kind_and_capabilities() {
        let walker = Capabilities::none();
        let swimmer = Capabilities::none().with_swim();

        assert!(!TileKind::Land.denies(walker));
        assert!(!TileKind::Land.denies(swimmer));
        assert!(TileKind::River.denies(walker));
        assert!(!TileKind::River.denies(swimmer));
        assert!(TileKind::Obstacle.denies(walker));
        assert!(TileKind::Obstacle.denies(swimmer));
    }

    #[test]
    fn capability_markers_are_independent() {
        let set = Capabilities::none().with_swim().with_evade();
        assert!(set.can_swim());
        assert!(set.can_evade());
        assert!(!set.can_hunt());

        let hunter = Capabilities::none().with_hunt();
        assert!(hunter.can_hunt());
        assert!(!hunter.can_swim());
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tile_coord_round_trips_through_bincode() {
        assert_round_trip(&TileCoord::new(15, 12));
    }

    #[test]
    fn tile_kind_round_trips_through_bincode() {
        assert_round_trip(&TileKind::River);
    }

    #[test]
    fn agent_kind_round_trips_through_bincode() {
        assert_round_trip(&AgentKind::Ambusher);
    }

    #[test]
    fn capabilities_round_trip_through_bincode() {
        assert_round_trip(&Capabilities::none().with_swim().with_hunt());
    }

    #[test]
    fn selection_error_round_trips_through_bincode() {
        assert_round_trip(&SelectionError::NotSelectable);
    }

    #[test]
    fn selection_errors_render_human_readable_messages() {
        assert_eq!(
            SelectionError::NotSelectable.to_string(),
            "the requested agent is not offered for external control"
        );
        assert_eq!(
            SelectionError::SessionInProgress.to_string(),
            "a round is already running, paused, or over"
        );
    }

    #[test]
    fn outcome_round_trips_through_bincode() {
        assert_round_trip(&Outcome::TimeExpired {
            prey_coins: 4,
            hunter_coins: 4,
        });
    }
}
