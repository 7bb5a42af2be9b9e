//! Shared integration-test harness: an in-process engine over the memory
//! store and messenger, plus helpers for spawning the `nightwatch` binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;

use nightwatch::config::TimingConfig;
use nightwatch::game::{Game, GameId, Player, Role, Stage};
use nightwatch::messaging::{MemoryMessenger, SentMessage};
use nightwatch::observability::EventEmitter;
use nightwatch::stage::{StageEngine, StageRegistry};
use nightwatch::store::{GameStore, MemoryStore};

/// Chat every test game is played in.
pub const CHAT: i64 = 500;

/// Seats one player per role; player `i` has id `100 + i` and name `p{i+1}`.
pub fn table(roles: &[Role]) -> Vec<Player> {
    roles
        .iter()
        .enumerate()
        .map(|(i, role)| Player::new(100 + i as i64, format!("p{}", i + 1), *role))
        .collect()
}

/// A game named `id` sitting at `stage`.
pub fn game_at(id: &str, stage: Stage, roles: &[Role]) -> Game {
    let mut game = Game::new(GameId::new(id), CHAT, table(roles));
    game.stage = stage;
    game
}

/// The usual table: don, two mafia, sheriff, three civilians.
pub fn classic() -> Vec<Role> {
    vec![
        Role::Don,
        Role::Mafia,
        Role::Mafia,
        Role::Sheriff,
        Role::Civilian,
        Role::Civilian,
        Role::Civilian,
    ]
}

/// Engine wired to in-memory collaborators that tests can inspect.
pub struct Harness {
    pub engine: Arc<StageEngine>,
    pub store: Arc<MemoryStore>,
    pub messenger: Arc<MemoryMessenger>,
    events_dir: tempfile::TempDir,
}

impl Harness {
    /// Standard stage table, default timings.
    #[allow(clippy::missing_panics_doc)]
    pub fn new(games: impl IntoIterator<Item = Game>) -> Self {
        Self::with_registry(games, StageRegistry::standard(&TimingConfig::default()))
    }

    #[allow(clippy::missing_panics_doc)]
    pub fn with_registry(games: impl IntoIterator<Item = Game>, registry: StageRegistry) -> Self {
        let store = Arc::new(MemoryStore::from_games(games).expect("unique game ids"));
        let messenger = Arc::new(MemoryMessenger::new());
        let events_dir = tempfile::tempdir().expect("tempdir");
        let events = EventEmitter::from_file(&events_dir.path().join("events.jsonl"))
            .expect("events file");
        let engine = StageEngine::new(Arc::new(registry), store.clone(), messenger.clone())
            .with_events(Arc::new(events));
        Self {
            engine: Arc::new(engine),
            store,
            messenger,
            events_dir,
        }
    }

    /// Current stored record of `id`.
    #[allow(clippy::missing_panics_doc)]
    pub async fn game(&self, id: &str) -> Option<Game> {
        self.store
            .find_game(&GameId::new(id))
            .await
            .expect("store read")
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.messenger.sent()
    }

    /// Emitted events, one JSON value per line.
    #[allow(clippy::missing_panics_doc)]
    pub fn events(&self) -> Vec<serde_json::Value> {
        let raw = std::fs::read_to_string(self.events_dir.path().join("events.jsonl"))
            .unwrap_or_default();
        raw.lines()
            .map(|l| serde_json::from_str(l).expect("event line is JSON"))
            .collect()
    }

    /// Emitted events of one `type`.
    pub fn events_of(&self, kind: &str) -> Vec<serde_json::Value> {
        self.events()
            .into_iter()
            .filter(|e| e["type"] == kind)
            .collect()
    }
}

// ============================================================================
// Binary helpers
// ============================================================================

/// Path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Runs the `nightwatch` binary to completion.
#[allow(clippy::missing_panics_doc)]
pub fn run_command(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_nightwatch"))
        .args(args)
        .env_remove("NIGHTWATCH_CONFIG")
        .env_remove("NIGHTWATCH_GAMES")
        .env_remove("NIGHTWATCH_LOG_LEVEL")
        .output()
        .expect("failed to run nightwatch")
}
