//! Player action handlers.
//!
//! Handlers validate an action against the current record, commit it with a
//! guarded store update, and advance the game themselves once the stage's
//! quorum is reached. Keyboard callbacks are routed here by [`dispatch`].

pub mod day;
pub mod night;
pub mod setup;

pub use day::cast_vote;
pub use night::{cast_shot, check};
pub use setup::{append_order, end_order, take_card};

use crate::error::{HandlerError, StoreError};
use crate::game::{Ballot, Game, GameId, GameUpdate, Player, PlayerIndex, Stage};
use crate::stage::StageEngine;
use crate::store::Guard;

/// What a successful action left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOutcome {
    /// The record right after the action was committed
    pub game: Game,
    /// Whether the action completed the stage and advanced the game
    pub advanced: bool,
}

/// A parsed keyboard callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    /// `take card`
    TakeCard,
    /// `append to order {n}`
    AppendOrder(PlayerIndex),
    /// `end order`
    EndOrder,
    /// `vote {n}`, `0` abstains
    Vote(Ballot),
    /// `shot {n}`
    Shot(PlayerIndex),
    /// `check don {n}` or `check sheriff {n}`
    Check(PlayerIndex),
}

impl Callback {
    /// Parses callback data; player numbers are 1-based.
    ///
    /// Returns `None` for data that carries no game action (`mafia team`,
    /// `get order`) or is malformed.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        let data = data.trim();
        if data == "take card" {
            return Some(Self::TakeCard);
        }
        if data == "end order" {
            return Some(Self::EndOrder);
        }
        if let Some(rest) = data.strip_prefix("append to order ") {
            return player_number(rest).map(Self::AppendOrder);
        }
        if let Some(rest) = data.strip_prefix("vote ") {
            let number: usize = rest.trim().parse().ok()?;
            return Some(Self::Vote(
                number
                    .checked_sub(1)
                    .map_or(Ballot::Abstain, Ballot::Against),
            ));
        }
        if let Some(rest) = data.strip_prefix("shot ") {
            return player_number(rest).map(Self::Shot);
        }
        if let Some(rest) = data
            .strip_prefix("check don ")
            .or_else(|| data.strip_prefix("check sheriff "))
        {
            return player_number(rest).map(Self::Check);
        }
        None
    }
}

fn player_number(raw: &str) -> Option<PlayerIndex> {
    raw.trim().parse::<usize>().ok()?.checked_sub(1)
}

/// Routes a keyboard callback pressed by `player` to its handler.
///
/// Returns `Ok(None)` for callbacks without a game action.
///
/// # Errors
///
/// Returns whatever the handler rejects the action with.
pub async fn dispatch(
    engine: &StageEngine,
    id: &GameId,
    player: PlayerIndex,
    data: &str,
) -> Result<Option<HandlerOutcome>, HandlerError> {
    let Some(callback) = Callback::parse(data) else {
        return Ok(None);
    };
    let outcome = match callback {
        Callback::TakeCard => take_card(engine, id, player).await?,
        Callback::AppendOrder(target) => append_order(engine, id, player, target).await?,
        Callback::EndOrder => end_order(engine, id, player).await?,
        Callback::Vote(ballot) => cast_vote(engine, id, player, ballot).await?,
        Callback::Shot(target) => cast_shot(engine, id, player, target).await?,
        Callback::Check(target) => check(engine, id, player, target).await?.1,
    };
    Ok(Some(outcome))
}

// ---------------------------------------------------------------------------
// Shared validation
// ---------------------------------------------------------------------------

async fn load(engine: &StageEngine, id: &GameId) -> Result<Game, HandlerError> {
    engine
        .store()
        .find_game(id)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.clone()).into())
}

fn expect_stage(game: &Game, expected: Stage) -> Result<(), HandlerError> {
    if game.stage == expected {
        Ok(())
    } else {
        Err(HandlerError::WrongStage {
            expected,
            actual: game.stage,
        })
    }
}

/// The acting player, who must exist and be alive.
fn living_player(game: &Game, index: PlayerIndex) -> Result<&Player, HandlerError> {
    let player = game
        .player(index)
        .ok_or(HandlerError::UnknownPlayer(index))?;
    if player.alive {
        Ok(player)
    } else {
        Err(HandlerError::NotAlive(index))
    }
}

fn not_played(game: &Game, index: PlayerIndex) -> Result<(), HandlerError> {
    if game.played.contains(&index) {
        Err(HandlerError::AlreadyPlayed(index))
    } else {
        Ok(())
    }
}

/// Applies `updates` under `guard`; a failed guard is a [`HandlerError::Conflict`].
async fn commit(
    engine: &StageEngine,
    id: &GameId,
    guard: Guard,
    updates: &[GameUpdate],
) -> Result<Game, HandlerError> {
    engine
        .store()
        .update_game_if(id, guard, updates)
        .await?
        .ok_or(HandlerError::Conflict)
}

/// Advances `game` when `quorum` holds.
async fn advance_if(
    engine: &StageEngine,
    game: Game,
    quorum: bool,
    increment: i32,
) -> HandlerOutcome {
    if !quorum {
        return HandlerOutcome {
            game,
            advanced: false,
        };
    }
    let advanced = engine.transition(&game, increment).await.is_change();
    HandlerOutcome { game, advanced }
}
