//! Actions of the setup stages: taking cards and setting the order.

use tracing::debug;

use crate::error::HandlerError;
use crate::game::{Game, GameId, GameUpdate, PlayerIndex, Role};
use crate::stage::{DEAL_CARDS, SET_ORDER, StageEngine};
use crate::store::Guard;

use super::{HandlerOutcome, advance_if, commit, expect_stage, living_player, load, not_played};

/// `player` takes their card.
///
/// Once every player has a card the game skips the terminal
/// "cards not taken" stage and goes straight to the order.
///
/// # Errors
///
/// Rejects the action outside the dealing stage, for unknown or dead
/// players, and for players who already took a card.
pub async fn take_card(
    engine: &StageEngine,
    id: &GameId,
    player: PlayerIndex,
) -> Result<HandlerOutcome, HandlerError> {
    let game = load(engine, id).await?;
    expect_stage(&game, DEAL_CARDS)?;
    living_player(&game, player)?;
    not_played(&game, player)?;

    let game = commit(
        engine,
        id,
        Guard::at(DEAL_CARDS).unplayed(player),
        &[GameUpdate::MarkPlayed(player)],
    )
    .await?;
    debug!(game_id = %id, player, taken = game.played.len(), "card taken");

    let everyone = game.played.len() == game.players.len();
    Ok(advance_if(engine, game, everyone, 2).await)
}

/// The don appends `target` to the shooting order.
///
/// A target already in the order is ignored.
///
/// # Errors
///
/// Rejects the action outside the order stage, from anyone but a living
/// don, and for unknown or dead targets.
pub async fn append_order(
    engine: &StageEngine,
    id: &GameId,
    don: PlayerIndex,
    target: PlayerIndex,
) -> Result<HandlerOutcome, HandlerError> {
    let game = load(engine, id).await?;
    expect_stage(&game, SET_ORDER)?;
    expect_don(&game, don)?;
    living_player(&game, target)?;

    if game.order.contains(&target) {
        return Ok(HandlerOutcome {
            game,
            advanced: false,
        });
    }

    let game = commit(
        engine,
        id,
        Guard::at(SET_ORDER),
        &[GameUpdate::AppendOrder(target)],
    )
    .await?;
    Ok(HandlerOutcome {
        game,
        advanced: false,
    })
}

/// The don closes the order; the game moves on immediately.
///
/// # Errors
///
/// Rejects the action outside the order stage and from anyone but a
/// living don.
pub async fn end_order(
    engine: &StageEngine,
    id: &GameId,
    don: PlayerIndex,
) -> Result<HandlerOutcome, HandlerError> {
    let game = load(engine, id).await?;
    expect_stage(&game, SET_ORDER)?;
    expect_don(&game, don)?;
    Ok(advance_if(engine, game, true, 1).await)
}

fn expect_don(game: &Game, index: PlayerIndex) -> Result<(), HandlerError> {
    if living_player(game, index)?.role == Role::Don {
        Ok(())
    } else {
        Err(HandlerError::NotPermitted(index))
    }
}
