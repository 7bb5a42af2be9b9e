//! The transition engine.
//!
//! [`StageEngine::advance`] moves a game forward and runs the entry action
//! of the stage it lands on. The store's conditional
//! [`advance_stage`](crate::store::GameStore::advance_stage) and
//! [`delete_game_if`](crate::store::GameStore::delete_game_if) are the only
//! serialization points: when two triggers race for the same game, one
//! transition commits and the other becomes a no-op that touches nothing.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures_util::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::error::StageError;
use crate::game::{Game, Stage, StageUpdate};
use crate::lang::Lang;
use crate::messaging::Messenger;
use crate::observability::events::{DeleteReason, Event, EventEmitter};
use crate::observability::metrics;
use crate::store::GameStore;

use super::actions;
use super::duration::resolve_opt;
use super::registry::{StageDescriptor, StageRegistry};

/// What an [`advance`](StageEngine::advance) call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The game entered a new stage; holds the post-update record.
    Moved(Game),
    /// A terminal stage was entered and the game deleted; holds the
    /// pre-deletion record.
    Deleted(Game),
    /// Nothing changed: guard, missing stage, lost race or store failure.
    Unchanged,
}

impl Transition {
    /// Whether the call changed the game.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Drives games through the stage registry.
pub struct StageEngine {
    registry: Arc<StageRegistry>,
    store: Arc<dyn GameStore>,
    messenger: Arc<dyn Messenger>,
    lang: Arc<Lang>,
    events: Arc<EventEmitter>,
}

impl std::fmt::Debug for StageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageEngine")
            .field("stages", &self.registry.len())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl StageEngine {
    /// Creates an engine with default templates and no event output.
    #[must_use]
    pub fn new(
        registry: Arc<StageRegistry>,
        store: Arc<dyn GameStore>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            registry,
            store,
            messenger,
            lang: Arc::new(Lang::default()),
            events: Arc::new(EventEmitter::noop()),
        }
    }

    /// Replaces the message templates.
    #[must_use]
    pub fn with_lang(mut self, lang: Arc<Lang>) -> Self {
        self.lang = lang;
        self
    }

    /// Replaces the event emitter.
    #[must_use]
    pub fn with_events(mut self, events: Arc<EventEmitter>) -> Self {
        self.events = events;
        self
    }

    /// The stage table.
    #[must_use]
    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// The game store.
    #[must_use]
    pub fn store(&self) -> &dyn GameStore {
        self.store.as_ref()
    }

    /// The chat client.
    #[must_use]
    pub fn messenger(&self) -> &dyn Messenger {
        self.messenger.as_ref()
    }

    /// The message templates.
    #[must_use]
    pub fn lang(&self) -> &Lang {
        &self.lang
    }

    /// The event stream.
    #[must_use]
    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    /// Looks up a stage descriptor.
    #[must_use]
    pub fn lookup_stage(&self, number: Stage) -> Option<&StageDescriptor> {
        self.registry.lookup(number)
    }

    /// Advances `game` by `increment` stages and returns the updated record,
    /// or `game` unchanged when nothing was committed.
    pub fn advance<'a>(&'a self, game: &'a Game, increment: i32) -> BoxFuture<'a, Game> {
        Box::pin(async move {
            match self.transition(game, increment).await {
                Transition::Moved(updated) => updated,
                Transition::Deleted(_) | Transition::Unchanged => game.clone(),
            }
        })
    }

    /// Like [`advance`](Self::advance), but reports what happened.
    pub fn transition<'a>(&'a self, game: &'a Game, increment: i32) -> BoxFuture<'a, Transition> {
        Box::pin(self.transition_inner(game, increment))
    }

    async fn transition_inner(&self, game: &Game, increment: i32) -> Transition {
        if self.registry.is_empty() || increment <= 0 {
            debug!(game_id = %game.id, increment, "advance ignored");
            return Transition::Unchanged;
        }

        let target = self.registry.target(game.stage, increment);
        let Some(descriptor) = self.registry.lookup(target) else {
            warn!(
                game_id = %game.id,
                from = game.stage,
                to = target,
                "no stage registered for target; game left as is"
            );
            return Transition::Unchanged;
        };

        if descriptor.terminal {
            return self.enter_terminal(game, descriptor).await;
        }

        let duration = resolve_opt(descriptor.duration.as_ref(), game);
        let update = StageUpdate {
            from: game.stage,
            to: target,
            next_stage_time: deadline(Utc::now(), duration),
        };

        let updated = match self.store.advance_stage(&game.id, update).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                debug!(
                    game_id = %game.id,
                    from = game.stage,
                    to = target,
                    "stage already moved or game gone; skipping"
                );
                return Transition::Unchanged;
            }
            Err(e) => {
                warn!(game_id = %game.id, from = game.stage, to = target, error = %e, "stage update failed");
                return Transition::Unchanged;
            }
        };

        self.clear_polls(game).await;

        info!(
            game_id = %game.id,
            from = game.stage,
            to = target,
            stage = descriptor.name(),
            next_in = ?duration,
            "stage entered"
        );
        metrics::record_transition(descriptor.name());
        self.events.emit(Event::StageEntered {
            timestamp: Utc::now(),
            game_id: game.id.clone(),
            from: game.stage,
            to: target,
            stage_name: descriptor.name().to_string(),
        });

        let result = actions::run(self, descriptor.action, &updated).await;
        self.contain(&updated, descriptor, result).await;
        Transition::Moved(updated)
    }

    async fn enter_terminal(&self, game: &Game, descriptor: &StageDescriptor) -> Transition {
        match self.store.delete_game_if(&game.id, game.stage).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(
                    game_id = %game.id,
                    from = game.stage,
                    "stage already moved or game gone; not deleting"
                );
                return Transition::Unchanged;
            }
            Err(e) => {
                warn!(game_id = %game.id, error = %e, "failed to delete game");
                return Transition::Unchanged;
            }
        }
        self.clear_polls(game).await;

        info!(game_id = %game.id, stage = descriptor.name(), "terminal stage entered; game deleted");
        self.record_deleted(game, descriptor.number, DeleteReason::Terminal);

        let result = actions::run(self, descriptor.action, game).await;
        if let Err(e) = result {
            metrics::record_action_failure(descriptor.name());
            warn!(game_id = %game.id, stage = descriptor.name(), error = %e, "farewell failed");
        }
        Transition::Deleted(game.clone())
    }

    /// Runs the entry action of the game's current stage.
    ///
    /// Errors are returned as they are, without the unreachable-chat
    /// cleanup that [`advance`](Self::advance) performs.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::NotFound`] if the current stage is not
    /// registered, or whatever the action fails with.
    pub async fn run_action(&self, game: &Game) -> Result<(), StageError> {
        let descriptor = self
            .registry
            .lookup(game.stage)
            .ok_or_else(|| StageError::NotFound {
                game: game.id.clone(),
                stage: game.stage,
            })?;
        actions::run(self, descriptor.action, game).await
    }

    /// Runs the current stage's action with the same failure handling as
    /// a transition.
    pub async fn execute_current(&self, game: &Game) {
        match self.registry.lookup(game.stage) {
            Some(descriptor) => {
                let result = actions::run(self, descriptor.action, game).await;
                self.contain(game, descriptor, result).await;
            }
            None => warn!(game_id = %game.id, stage = game.stage, "no stage registered"),
        }
    }

    /// Applies the failure policy to an action result.
    async fn contain(
        &self,
        game: &Game,
        descriptor: &StageDescriptor,
        result: Result<(), StageError>,
    ) {
        let Err(error) = result else {
            return;
        };
        metrics::record_action_failure(descriptor.name());

        if error.is_unreachable() {
            warn!(
                game_id = %game.id,
                chat = game.chat,
                stage = descriptor.name(),
                error = %error,
                "chat unreachable; deleting game"
            );
            match self.store.delete_game(&game.id).await {
                Ok(true) => self.record_deleted(game, descriptor.number, DeleteReason::Unreachable),
                Ok(false) => {}
                Err(e) => warn!(game_id = %game.id, error = %e, "failed to delete game"),
            }
        } else {
            warn!(
                game_id = %game.id,
                stage = descriptor.name(),
                error = %error,
                "stage action failed"
            );
        }
    }

    /// Drops the keyboards of the stage the game just left.
    async fn clear_polls(&self, game: &Game) {
        if let Err(e) = self.store.clear_polls(game.chat).await {
            warn!(game_id = %game.id, chat = game.chat, error = %e, "failed to clear polls");
        }
    }

    fn record_deleted(&self, game: &Game, stage: Stage, reason: DeleteReason) {
        metrics::record_game_deleted(reason);
        self.events.emit(Event::GameDeleted {
            timestamp: Utc::now(),
            game_id: game.id.clone(),
            stage,
            reason,
        });
    }
}

/// `now + duration`, saturating at the latest representable time.
fn deadline(now: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(duration)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_adds_duration() {
        let now = Utc::now();
        assert_eq!(
            deadline(now, Duration::from_secs(30)),
            now + TimeDelta::seconds(30)
        );
        assert_eq!(deadline(now, Duration::ZERO), now);
    }

    #[test]
    fn deadline_saturates() {
        let now = Utc::now();
        assert_eq!(deadline(now, Duration::MAX), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn transition_change() {
        assert!(!Transition::Unchanged.is_change());
    }
}
