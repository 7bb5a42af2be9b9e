//! `run`: drives a set of stored games through their stages.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::cli::args::RunArgs;
use crate::error::NightwatchError;
use crate::game::Game;
use crate::messaging::ConsoleMessenger;
use crate::observability::{Event, EventEmitter, init_metrics};
use crate::stage::{Scheduler, StageEngine, StageRegistry};
use crate::store::MemoryStore;

use super::load_config;

/// Load the games, sweep until cancelled (or once), then write them back.
///
/// # Errors
///
/// Returns an error if the configuration or game file cannot be loaded,
/// the metrics listener cannot start, or the snapshot cannot be written.
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<(), NightwatchError> {
    let config = load_config(args.config.as_deref())?;

    if args.metrics_port.is_some() {
        init_metrics(args.metrics_port)?;
    }

    let games = read_games(&args.games)?;
    let loaded = games.len();
    let store = Arc::new(MemoryStore::from_games(games)?);

    let events = match &args.events_file {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::stderr(),
    };

    let registry = Arc::new(StageRegistry::standard(&config.timings));
    let engine = Arc::new(
        StageEngine::new(registry, store.clone(), Arc::new(ConsoleMessenger::new()))
            .with_lang(Arc::new(config.lang.clone()))
            .with_events(Arc::new(events)),
    );

    tracing::info!(games = loaded, "engine started");
    engine.events().emit(Event::EngineStarted {
        timestamp: Utc::now(),
        games: loaded,
    });

    let scheduler = Scheduler::new(Arc::clone(&engine), config.sweep.interval);
    let reason = if args.once {
        let report = scheduler.sweep_once(Utc::now()).await?;
        tracing::info!(due = report.due, advanced = report.advanced, "single sweep done");
        "single sweep"
    } else {
        scheduler.run(cancel).await;
        "cancelled"
    };

    engine.events().emit(Event::EngineStopped {
        timestamp: Utc::now(),
        reason: reason.to_string(),
    });
    tracing::info!(games = store.len(), reason, "engine stopped");

    if let Some(output) = &args.output {
        write_games(output, &store.snapshot())?;
    }
    Ok(())
}

fn read_games(path: &Path) -> Result<Vec<Game>, NightwatchError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_games(path: &Path, games: &[Game]) -> Result<(), NightwatchError> {
    let json = serde_json::to_string_pretty(games)?;
    std::fs::write(path, json)?;
    tracing::debug!(path = %path.display(), games = games.len(), "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameId, Player, Role};

    #[test]
    fn games_survive_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.json");
        let game = Game::new(
            GameId::new("g1"),
            42,
            vec![Player::new(7, "ann", Role::Don)],
        );

        write_games(&path, std::slice::from_ref(&game)).unwrap();
        let read = read_games(&path).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id, game.id);
        assert_eq!(read[0].players[0].role, Role::Don);
    }

    #[test]
    fn missing_games_file_is_io_error() {
        let err = read_games(Path::new("/nonexistent/games.json")).unwrap_err();
        assert!(matches!(err, NightwatchError::Io(_)));
    }
}
