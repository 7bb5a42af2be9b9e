//! Document store for game and poll records.
//!
//! The [`GameStore`] trait is the only way the engine touches persisted
//! state. Writes are typed ([`GameUpdate`], [`StageUpdate`]) and the two
//! conditional writes, [`GameStore::advance_stage`] and
//! [`GameStore::update_game_if`], must be atomic: they are what keeps two
//! racing triggers from both acting on the same stage.

pub mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::game::{ChatId, Game, GameId, GameUpdate, MessageId, PlayerIndex, Stage, StageUpdate};

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Ephemeral keyboard state of a chat, dropped on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollRecord {
    /// Chat the poll lives in
    pub chat: ChatId,
    /// Message carrying the keyboard
    pub message_id: MessageId,
    /// Stage that opened the poll
    pub stage: Stage,
}

/// Precondition of a conditional game update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guard {
    /// Stage the game must be at
    pub stage: Stage,
    /// Player that must not have acted yet this stage
    pub unplayed: Option<PlayerIndex>,
}

impl Guard {
    /// Guard on the stage only.
    #[must_use]
    pub const fn at(stage: Stage) -> Self {
        Self {
            stage,
            unplayed: None,
        }
    }

    /// Additionally requires `player` not to have acted yet.
    #[must_use]
    pub const fn unplayed(mut self, player: PlayerIndex) -> Self {
        self.unplayed = Some(player);
        self
    }

    /// Whether `game` satisfies the guard.
    #[must_use]
    pub fn holds(&self, game: &Game) -> bool {
        game.stage == self.stage
            && self
                .unplayed
                .is_none_or(|player| !game.played.contains(&player))
    }
}

/// Async store of game and poll records.
#[async_trait::async_trait]
pub trait GameStore: Send + Sync {
    /// Inserts a new game.
    ///
    /// Fails with [`StoreError::Duplicate`] if the id is taken.
    async fn insert_game(&self, game: Game) -> Result<()>;

    /// Fetches a game by id.
    async fn find_game(&self, id: &GameId) -> Result<Option<Game>>;

    /// Atomically moves a game from `update.from` to `update.to`.
    ///
    /// Returns the post-update record, or `None` if the game is gone or no
    /// longer at `update.from` (another trigger won).
    async fn advance_stage(&self, id: &GameId, update: StageUpdate) -> Result<Option<Game>>;

    /// Applies updates unconditionally and returns the updated record.
    async fn update_game(&self, id: &GameId, updates: &[GameUpdate]) -> Result<Option<Game>>;

    /// Applies updates only while `guard` holds; returns `None` otherwise.
    async fn update_game_if(
        &self,
        id: &GameId,
        guard: Guard,
        updates: &[GameUpdate],
    ) -> Result<Option<Game>>;

    /// Deletes a game; returns whether it existed.
    async fn delete_game(&self, id: &GameId) -> Result<bool>;

    /// Deletes a game only while it still sits at `expected`; returns
    /// whether this call removed it.
    async fn delete_game_if(&self, id: &GameId, expected: Stage) -> Result<bool>;

    /// Games whose stage deadline is at or before `now`.
    async fn due_games(&self, now: DateTime<Utc>) -> Result<Vec<Game>>;

    /// All stored games.
    async fn games(&self) -> Result<Vec<Game>>;

    /// Records a poll for a chat.
    async fn put_poll(&self, poll: PollRecord) -> Result<()>;

    /// Polls currently recorded for a chat.
    async fn polls(&self, chat: ChatId) -> Result<Vec<PollRecord>>;

    /// Deletes every poll of a chat; returns how many were removed.
    async fn clear_polls(&self, chat: ChatId) -> Result<usize>;
}
