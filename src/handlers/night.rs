//! Night actions: shooting and role checks.

use tracing::debug;

use crate::error::HandlerError;
use crate::game::{GameId, GameUpdate, PlayerIndex, Role, Shot};
use crate::stage::{DON_CHECK, SHERIFF_CHECK, SHOOTING, StageEngine};
use crate::store::Guard;

use super::{
    HandlerOutcome, advance_if, commit, expect_stage, living_player, load, not_played,
};

/// `shooter` fires at `target`.
///
/// Each armed player shoots once. When the last living armed player has
/// fired, the game moves on without waiting for the timer.
///
/// # Errors
///
/// Rejects the action outside the shooting, from unarmed, dead or unknown
/// shooters, a second shot of the same shooter, and unknown or dead
/// targets.
pub async fn cast_shot(
    engine: &StageEngine,
    id: &GameId,
    shooter: PlayerIndex,
    target: PlayerIndex,
) -> Result<HandlerOutcome, HandlerError> {
    let game = load(engine, id).await?;
    expect_stage(&game, SHOOTING)?;
    if !living_player(&game, shooter)?.role.is_armed() {
        return Err(HandlerError::NotPermitted(shooter));
    }
    not_played(&game, shooter)?;
    living_player(&game, target)?;

    let game = commit(
        engine,
        id,
        Guard::at(SHOOTING).unplayed(shooter),
        &[
            GameUpdate::AddShot(Shot { shooter, target }),
            GameUpdate::MarkPlayed(shooter),
        ],
    )
    .await?;
    debug!(game_id = %id, shooter, target, "shot fired");

    let everyone = game.living_armed().all(|(i, _)| game.played.contains(&i));
    Ok(advance_if(engine, game, everyone, 1).await)
}

/// `checker` checks `target` and learns the verdict.
///
/// During the don's check the don learns whether the target is the
/// sheriff; during the sheriff's check the sheriff learns whether the
/// target is armed. Each check ends its stage.
///
/// # Errors
///
/// Rejects checks by anyone but a living don or sheriff, checks outside
/// the checker's own stage, a second check, and unknown or dead targets.
pub async fn check(
    engine: &StageEngine,
    id: &GameId,
    checker: PlayerIndex,
    target: PlayerIndex,
) -> Result<(bool, HandlerOutcome), HandlerError> {
    let game = load(engine, id).await?;
    let stage = match living_player(&game, checker)?.role {
        Role::Don => DON_CHECK,
        Role::Sheriff => SHERIFF_CHECK,
        Role::Civilian | Role::Mafia => return Err(HandlerError::NotPermitted(checker)),
    };
    expect_stage(&game, stage)?;
    not_played(&game, checker)?;
    let checked = living_player(&game, target)?.role;

    let verdict = if stage == DON_CHECK {
        checked == Role::Sheriff
    } else {
        checked.is_armed()
    };

    let game = commit(
        engine,
        id,
        Guard::at(stage).unplayed(checker),
        &[GameUpdate::MarkPlayed(checker)],
    )
    .await?;
    debug!(game_id = %id, checker, target, "check made");

    Ok((verdict, advance_if(engine, game, true, 1).await))
}
