//! Stage entry actions.
//!
//! Each action receives the record as it was right after the transition.
//! State changes are committed to the store before any message goes out,
//! so a failed delivery never loses a resolution.

use chrono::Utc;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::error::StageError;
use crate::game::format::{format_living, format_votes};
use crate::game::resolve::{resolve_shots, resolve_vote};
use crate::game::{Game, GameUpdate, MessageId, PlayerIndex, Role};
use crate::lang::fill;
use crate::messaging::{Button, Keyboard};
use crate::observability::events::{EliminationCause, Event};
use crate::observability::metrics;
use crate::store::PollRecord;

use super::engine::StageEngine;
use super::registry::StageAction;

/// Runs the entry action `action` for `game`.
///
/// # Errors
///
/// Returns the first delivery or store failure; state committed before the
/// failure stays committed.
pub async fn run(engine: &StageEngine, action: StageAction, game: &Game) -> Result<(), StageError> {
    debug!(game_id = %game.id, stage = action.name(), "running stage action");
    match action {
        StageAction::DealCards => Ok(()),
        StageAction::CardsNotTaken => cards_not_taken(engine, game).await,
        StageAction::SetOrder => set_order(engine, game).await,
        StageAction::GetOrder => get_order(engine, game).await,
        StageAction::Discussion => discussion(engine, game).await,
        StageAction::Vote => vote(engine, game).await,
        StageAction::LastWordsCriminal => last_words_criminal(engine, game).await,
        StageAction::Night => night(engine, game).await,
        StageAction::Shooting => shooting(engine, game).await,
        StageAction::DonCheck => don_check(engine, game).await,
        StageAction::SheriffCheck => sheriff_check(engine, game).await,
        StageAction::LastWordsVictim => last_words_victim(engine, game).await,
    }
}

/// Re-renders the vote message with the current tally.
///
/// # Errors
///
/// Returns the delivery or store failure.
pub async fn refresh_vote(engine: &StageEngine, game: &Game) -> Result<(), StageError> {
    let text = vote_text(engine, game);
    edit_or_send(engine, game, &text, Some(&vote_keyboard(engine, game))).await?;
    Ok(())
}

async fn cards_not_taken(engine: &StageEngine, game: &Game) -> Result<(), StageError> {
    let text = &engine.lang().cards_not_taken;
    match game.message_id {
        Some(message_id) => {
            engine
                .messenger()
                .edit(game.chat, message_id, text, None)
                .await?;
        }
        None => {
            engine.messenger().send(game.chat, text, None).await?;
        }
    }
    Ok(())
}

async fn set_order(engine: &StageEngine, game: &Game) -> Result<(), StageError> {
    let lang = engine.lang();
    if !game.has_role(Role::Mafia) {
        info!(game_id = %game.id, "no mafia team; skipping the order");
        engine.messenger().send(game.chat, &lang.no_mafia, None).await?;
        engine.advance(game, 2).await;
        return Ok(());
    }

    let buttons = game
        .living()
        .map(|(i, _)| number_button(i, "append to order"))
        .collect();
    let keyboard = Keyboard::grid(buttons)
        .with_row(Button::new(&lang.team_button, "mafia team"))
        .with_row(Button::new(&lang.end_order_button, "end order"));

    let don = lang.roles.capitalized(Role::Don);
    let text = fill(&lang.set_order, &[("don", &don)]);
    send_control(engine, game, &text, Some(&keyboard)).await
}

async fn get_order(engine: &StageEngine, game: &Game) -> Result<(), StageError> {
    let lang = engine.lang();
    let keyboard = Keyboard::grid(vec![Button::new(&lang.get_order_button, "get order")]);
    let text = fill(
        &lang.get_order,
        &[
            ("don", &lang.roles.capitalized(Role::Don)),
            ("mafia", &lang.roles.capitalized(Role::Mafia)),
        ],
    );
    edit_or_send(engine, game, &text, Some(&keyboard)).await?;
    Ok(())
}

async fn discussion(engine: &StageEngine, game: &Game) -> Result<(), StageError> {
    let lang = engine.lang();
    let greeting = if game.is_first_day() {
        lang.first_morning.clone()
    } else {
        game.victim
            .and_then(|id| game.players.iter().position(|p| p.id == id))
            .map_or_else(
                || lang.peaceful_night.clone(),
                |index| {
                    fill(
                        &lang.night_victim,
                        &[
                            ("number", &(index + 1).to_string()),
                            ("name", &game.players[index].name),
                        ],
                    )
                },
            )
    };

    let text = fill(
        &lang.morning,
        &[
            ("greeting", &greeting),
            ("day", &(game.day_count + 1).to_string()),
            ("order", &format_living(game, &lang.roles)),
        ],
    );
    engine.messenger().send(game.chat, &text, None).await?;
    Ok(())
}

async fn vote(engine: &StageEngine, game: &Game) -> Result<(), StageError> {
    if game.alive_count() == 0 {
        engine
            .messenger()
            .send(game.chat, &engine.lang().no_voters, None)
            .await?;
        engine.advance(game, 1).await;
        return Ok(());
    }

    let text = vote_text(engine, game);
    send_control(engine, game, &text, Some(&vote_keyboard(engine, game))).await
}

async fn last_words_criminal(engine: &StageEngine, game: &Game) -> Result<(), StageError> {
    let lang = engine.lang();
    let criminal = resolve_vote(&game.sealed.vote);

    let mut updates = vec![GameUpdate::ClearSealedVote];
    if let Some(index) = criminal {
        updates.extend(eliminate(game, index));
    }
    engine.store().update_game(&game.id, &updates).await?;
    if let Some(index) = criminal {
        record_elimination(engine, game, index, EliminationCause::Vote);
    }

    let text = criminal.map_or_else(
        || lang.no_criminal.clone(),
        |index| {
            fill(
                &lang.jailed,
                &[
                    ("number", &(index + 1).to_string()),
                    ("name", &game.players[index].name),
                ],
            )
        },
    );
    edit_or_send(engine, game, &text, None).await?;
    Ok(())
}

async fn night(engine: &StageEngine, game: &Game) -> Result<(), StageError> {
    let lang = engine.lang();
    let text = fill(&lang.night, &[("mafia", &lang.roles.capitalized(Role::Mafia))]);
    let message_id = engine.messenger().send(game.chat, &text, None).await?;
    engine
        .store()
        .update_game(
            &game.id,
            &[GameUpdate::ClearVictim, GameUpdate::SetMessageId(message_id)],
        )
        .await?;
    Ok(())
}

async fn shooting(engine: &StageEngine, game: &Game) -> Result<(), StageError> {
    let lang = engine.lang();
    let mut targets: Vec<PlayerIndex> = game.living().map(|(i, _)| i).collect();
    targets.shuffle(&mut rand::rng());

    let keyboard = Keyboard::grid(
        targets
            .into_iter()
            .map(|i| number_button(i, "shot"))
            .collect(),
    );
    let text = fill(
        &lang.shooting,
        &[
            ("mafia", &lang.roles.capitalized(Role::Mafia)),
            ("order", &format_living(game, &lang.roles)),
        ],
    );
    let message_id = edit_or_send(engine, game, &text, Some(&keyboard)).await?;
    open_poll(engine, game, message_id).await
}

async fn don_check(engine: &StageEngine, game: &Game) -> Result<(), StageError> {
    let lang = engine.lang();
    let text = fill(
        &lang.don_check,
        &[
            ("mafia", &lang.roles.capitalized(Role::Mafia)),
            ("don", &lang.roles.capitalized(Role::Don)),
            ("order", &format_living(game, &lang.roles)),
        ],
    );
    let keyboard = living_keyboard(game, "check don");
    let message_id = edit_or_send(engine, game, &text, Some(&keyboard)).await?;
    open_poll(engine, game, message_id).await
}

async fn sheriff_check(engine: &StageEngine, game: &Game) -> Result<(), StageError> {
    let lang = engine.lang();
    let text = fill(
        &lang.sheriff_check,
        &[
            ("don", &lang.roles.capitalized(Role::Don)),
            ("sheriff", lang.roles.title(Role::Sheriff)),
            ("order", &format_living(game, &lang.roles)),
        ],
    );
    let keyboard = living_keyboard(game, "check sheriff");
    let message_id = edit_or_send(engine, game, &text, Some(&keyboard)).await?;
    open_poll(engine, game, message_id).await
}

async fn last_words_victim(engine: &StageEngine, game: &Game) -> Result<(), StageError> {
    let victim = resolve_shots(game, &game.sealed.shots);

    let mut updates = vec![GameUpdate::ClearSealedShots];
    if let Some(index) = victim {
        updates.extend(eliminate(game, index));
    }
    let committed = engine.store().update_game(&game.id, &updates).await?;

    let Some(index) = victim else {
        debug!(game_id = %game.id, "no one shot; moving on");
        engine.advance(committed.as_ref().unwrap_or(game), 1).await;
        return Ok(());
    };
    record_elimination(engine, game, index, EliminationCause::Shooting);

    let text = fill(
        &engine.lang().killed,
        &[
            ("number", &(index + 1).to_string()),
            ("name", &game.players[index].name),
        ],
    );
    edit_or_send(engine, game, &text, None).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn eliminate(game: &Game, index: PlayerIndex) -> Vec<GameUpdate> {
    let mut updates = vec![GameUpdate::Kill(index)];
    if let Some(player) = game.player(index) {
        updates.push(GameUpdate::SetVictim(player.id));
    }
    updates
}

fn record_elimination(
    engine: &StageEngine,
    game: &Game,
    index: PlayerIndex,
    cause: EliminationCause,
) {
    let Some(player) = game.player(index) else {
        return;
    };
    info!(game_id = %game.id, player = player.id, ?cause, "player eliminated");
    metrics::record_elimination(cause);
    engine.events().emit(Event::PlayerEliminated {
        timestamp: Utc::now(),
        game_id: game.id.clone(),
        player: player.id,
        cause,
    });
}

fn vote_text(engine: &StageEngine, game: &Game) -> String {
    let lang = engine.lang();
    fill(&lang.vote, &[("vote", &format_votes(game, &lang.abstain))])
}

fn vote_keyboard(engine: &StageEngine, game: &Game) -> Keyboard {
    living_keyboard(game, "vote").with_row(Button::new(&engine.lang().abstain, "vote 0"))
}

/// One button per living player, labelled with the roster number.
fn living_keyboard(game: &Game, callback: &str) -> Keyboard {
    Keyboard::grid(
        game.living()
            .map(|(i, _)| number_button(i, callback))
            .collect(),
    )
}

fn number_button(index: PlayerIndex, callback: &str) -> Button {
    let number = index + 1;
    Button::new(number.to_string(), format!("{callback} {number}"))
}

/// Sends a new control message for the stage and remembers it.
async fn send_control(
    engine: &StageEngine,
    game: &Game,
    text: &str,
    keyboard: Option<&Keyboard>,
) -> Result<(), StageError> {
    let message_id = engine.messenger().send(game.chat, text, keyboard).await?;
    engine
        .store()
        .update_game(&game.id, &[GameUpdate::SetMessageId(message_id)])
        .await?;
    if keyboard.is_some() {
        open_poll(engine, game, message_id).await?;
    }
    Ok(())
}

/// Edits the stage's control message, or sends one if there is none yet.
async fn edit_or_send(
    engine: &StageEngine,
    game: &Game,
    text: &str,
    keyboard: Option<&Keyboard>,
) -> Result<MessageId, StageError> {
    if let Some(message_id) = game.message_id {
        engine
            .messenger()
            .edit(game.chat, message_id, text, keyboard)
            .await?;
        return Ok(message_id);
    }
    let message_id = engine.messenger().send(game.chat, text, keyboard).await?;
    engine
        .store()
        .update_game(&game.id, &[GameUpdate::SetMessageId(message_id)])
        .await?;
    Ok(message_id)
}

async fn open_poll(
    engine: &StageEngine,
    game: &Game,
    message_id: MessageId,
) -> Result<(), StageError> {
    engine
        .store()
        .put_poll(PollRecord {
            chat: game.chat,
            message_id,
            stage: game.stage,
        })
        .await?;
    Ok(())
}
