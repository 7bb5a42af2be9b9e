//! Game records and the pure rules that operate on them.
//!
//! - [`model`] - the persisted [`Game`] record and its typed updates
//! - [`role`] - roles and their display titles
//! - [`resolve`] - vote and shot resolution
//! - [`format`] - roster and tally rendering

pub mod format;
pub mod model;
pub mod resolve;
pub mod role;

pub use model::{Ballot, Game, GameUpdate, Player, Sealed, Shot, StageUpdate};
pub use role::{Role, RoleTitles};

use serde::{Deserialize, Serialize};

/// Stage number. Negative stages are setup, `0..` is the day/night cycle.
pub type Stage = i32;

/// Position of a player in [`Game::players`]. Stable for the whole game.
pub type PlayerIndex = usize;

/// Chat (channel) identifier.
pub type ChatId = i64;

/// Identifier of a message inside a chat.
pub type MessageId = i64;

/// Chat-platform identifier of a player.
pub type PlayerId = i64;

/// Opaque identifier of a game record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    /// Creates a new `GameId` from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
