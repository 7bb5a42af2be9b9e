//! In-process store backed by `DashMap`.
//!
//! Each conditional write holds the shard lock of its game for the whole
//! check-and-update, which gives the atomicity [`GameStore`] requires.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::StoreError;
use crate::game::{ChatId, Game, GameId, GameUpdate, Stage, StageUpdate};

use super::{GameStore, Guard, PollRecord, Result};

/// Concurrent in-memory [`GameStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: DashMap<GameId, Game>,
    polls: DashMap<ChatId, Vec<PollRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `games`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if two games share an id.
    pub fn from_games(games: impl IntoIterator<Item = Game>) -> Result<Self> {
        let store = Self::new();
        for game in games {
            store.insert(game)?;
        }
        Ok(store)
    }

    fn insert(&self, game: Game) -> Result<()> {
        match self.games.entry(game.id.clone()) {
            Entry::Occupied(entry) => Err(StoreError::Duplicate(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(game);
                Ok(())
            }
        }
    }

    /// Copies out every game, ordered by id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Game> {
        let mut games: Vec<Game> = self.games.iter().map(|e| e.value().clone()).collect();
        games.sort_by(|a, b| a.id.cmp(&b.id));
        games
    }

    /// Number of stored games.
    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Whether no games are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[async_trait::async_trait]
impl GameStore for MemoryStore {
    async fn insert_game(&self, game: Game) -> Result<()> {
        self.insert(game)
    }

    async fn find_game(&self, id: &GameId) -> Result<Option<Game>> {
        Ok(self.games.get(id).map(|g| g.value().clone()))
    }

    async fn advance_stage(&self, id: &GameId, update: StageUpdate) -> Result<Option<Game>> {
        let Some(mut game) = self.games.get_mut(id) else {
            return Ok(None);
        };
        if game.stage != update.from {
            return Ok(None);
        }
        game.enter_stage(&update);
        Ok(Some(game.clone()))
    }

    async fn update_game(&self, id: &GameId, updates: &[GameUpdate]) -> Result<Option<Game>> {
        let Some(mut game) = self.games.get_mut(id) else {
            return Ok(None);
        };
        game.apply_all(updates)?;
        Ok(Some(game.clone()))
    }

    async fn update_game_if(
        &self,
        id: &GameId,
        guard: Guard,
        updates: &[GameUpdate],
    ) -> Result<Option<Game>> {
        let Some(mut game) = self.games.get_mut(id) else {
            return Ok(None);
        };
        if !guard.holds(&game) {
            return Ok(None);
        }
        game.apply_all(updates)?;
        Ok(Some(game.clone()))
    }

    async fn delete_game(&self, id: &GameId) -> Result<bool> {
        Ok(self.games.remove(id).is_some())
    }

    async fn delete_game_if(&self, id: &GameId, expected: Stage) -> Result<bool> {
        Ok(self
            .games
            .remove_if(id, |_, game| game.stage == expected)
            .is_some())
    }

    async fn due_games(&self, now: DateTime<Utc>) -> Result<Vec<Game>> {
        Ok(self
            .games
            .iter()
            .filter(|g| g.is_due(now))
            .map(|g| g.value().clone())
            .collect())
    }

    async fn games(&self) -> Result<Vec<Game>> {
        Ok(self.snapshot())
    }

    async fn put_poll(&self, poll: PollRecord) -> Result<()> {
        self.polls.entry(poll.chat).or_default().push(poll);
        Ok(())
    }

    async fn polls(&self, chat: ChatId) -> Result<Vec<PollRecord>> {
        Ok(self.polls.get(&chat).map(|p| p.clone()).unwrap_or_default())
    }

    async fn clear_polls(&self, chat: ChatId) -> Result<usize> {
        Ok(self.polls.remove(&chat).map_or(0, |(_, polls)| polls.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Player, Role};
    use std::sync::Arc;

    fn game(id: &str) -> Game {
        Game::new(
            GameId::new(id),
            10,
            vec![
                Player::new(1, "a", Role::Mafia),
                Player::new(2, "b", Role::Civilian),
            ],
        )
    }

    fn to(from: i32, to: i32) -> StageUpdate {
        StageUpdate {
            from,
            to,
            next_stage_time: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = MemoryStore::new();
        store.insert_game(game("g")).await.unwrap();
        let err = store.insert_game(game("g")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn advance_stage_requires_expected_stage() {
        let store = MemoryStore::from_games([game("g")]).unwrap();
        let id = GameId::new("g");

        assert!(store.advance_stage(&id, to(3, 4)).await.unwrap().is_none());
        let updated = store.advance_stage(&id, to(0, 1)).await.unwrap().unwrap();
        assert_eq!(updated.stage, 1);
        assert_eq!(updated.day_count, 1);
        assert!(store.advance_stage(&id, to(0, 1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn conditional_delete_requires_expected_stage() {
        let store = MemoryStore::from_games([game("g")]).unwrap();
        let id = GameId::new("g");

        assert!(!store.delete_game_if(&id, -4).await.unwrap());
        assert!(store.find_game(&id).await.unwrap().is_some());
        assert!(store.delete_game_if(&id, 0).await.unwrap());
        assert!(store.find_game(&id).await.unwrap().is_none());
        assert!(!store.delete_game_if(&id, 0).await.unwrap());
    }

    #[tokio::test]
    async fn advance_stage_on_missing_game() {
        let store = MemoryStore::new();
        let result = store.advance_stage(&GameId::new("nope"), to(0, 1)).await;
        assert!(result.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_advances_only_one_wins() {
        let store = Arc::new(MemoryStore::from_games([game("g")]).unwrap());
        let mut handles = vec![];
        for _ in 0..10 {
            let s = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                s.advance_stage(&GameId::new("g"), to(0, 1)).await.unwrap()
            }));
        }

        let mut wins = 0;
        for h in handles {
            if h.await.unwrap().is_some() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        let stored = store.find_game(&GameId::new("g")).await.unwrap().unwrap();
        assert_eq!(stored.day_count, 1);
    }

    #[tokio::test]
    async fn guarded_update_respects_guard() {
        let store = MemoryStore::from_games([game("g")]).unwrap();
        let id = GameId::new("g");

        let skipped = store
            .update_game_if(&id, Guard::at(4), &[GameUpdate::Kill(1)])
            .await
            .unwrap();
        assert!(skipped.is_none());

        let applied = store
            .update_game_if(&id, Guard::at(0).unplayed(1), &[GameUpdate::MarkPlayed(1)])
            .await
            .unwrap()
            .unwrap();
        assert!(applied.played.contains(&1));

        let again = store
            .update_game_if(&id, Guard::at(0).unplayed(1), &[GameUpdate::MarkPlayed(1)])
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn failed_update_leaves_record_untouched() {
        let store = MemoryStore::from_games([game("g")]).unwrap();
        let id = GameId::new("g");
        let err = store
            .update_game(&id, &[GameUpdate::Kill(0), GameUpdate::Kill(7)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PlayerOutOfRange { .. }));
        let stored = store.find_game(&id).await.unwrap().unwrap();
        assert!(stored.players[0].alive);
    }

    #[tokio::test]
    async fn due_games_filters_by_deadline() {
        let now = Utc::now();
        let mut due = game("due");
        due.next_stage_time = Some(now - chrono::Duration::seconds(1));
        let mut later = game("later");
        later.next_stage_time = Some(now + chrono::Duration::seconds(60));
        let idle = game("idle");

        let store = MemoryStore::from_games([due, later, idle]).unwrap();
        let games = store.due_games(now).await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, GameId::new("due"));
    }

    #[tokio::test]
    async fn polls_are_scoped_by_chat() {
        let store = MemoryStore::new();
        for (chat, message_id) in [(1, 10), (1, 11), (2, 20)] {
            store
                .put_poll(PollRecord {
                    chat,
                    message_id,
                    stage: 1,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.clear_polls(1).await.unwrap(), 2);
        assert!(store.polls(1).await.unwrap().is_empty());
        assert_eq!(store.polls(2).await.unwrap().len(), 1);
        assert_eq!(store.clear_polls(3).await.unwrap(), 0);
    }
}
