//! Day actions: voting.

use tracing::{debug, warn};

use crate::error::HandlerError;
use crate::game::{Ballot, GameId, GameUpdate, PlayerIndex};
use crate::stage::{StageEngine, VOTE, actions};
use crate::store::Guard;

use super::{HandlerOutcome, advance_if, commit, expect_stage, living_player, load};

/// `voter` casts `ballot`, replacing any earlier ballot of theirs.
///
/// When every living player has voted the game moves on to the vote
/// resolution; otherwise the vote message is re-rendered with the new
/// tally.
///
/// # Errors
///
/// Rejects the action outside the vote, for unknown or dead voters, and
/// for ballots against unknown or dead players.
pub async fn cast_vote(
    engine: &StageEngine,
    id: &GameId,
    voter: PlayerIndex,
    ballot: Ballot,
) -> Result<HandlerOutcome, HandlerError> {
    let game = load(engine, id).await?;
    expect_stage(&game, VOTE)?;
    living_player(&game, voter)?;
    if let Ballot::Against(target) = ballot {
        living_player(&game, target)?;
    }

    let game = commit(
        engine,
        id,
        Guard::at(VOTE),
        &[
            GameUpdate::CastVote { voter, ballot },
            GameUpdate::MarkPlayed(voter),
        ],
    )
    .await?;
    debug!(game_id = %id, voter, ?ballot, "vote cast");

    let everyone = game.living().all(|(i, _)| game.played.contains(&i));
    if !everyone {
        if let Err(e) = actions::refresh_vote(engine, &game).await {
            warn!(game_id = %id, error = %e, "failed to refresh the vote message");
        }
    }
    Ok(advance_if(engine, game, everyone, 1).await)
}
