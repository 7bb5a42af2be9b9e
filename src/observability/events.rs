//! Structured event stream for `nightwatch`.
//!
//! Discrete, typed events emitted while games move through their stages.
//! Events are serialized as newline-delimited JSON (JSONL) and carry a
//! monotonically increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::game::{GameId, PlayerId, Stage};

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// Why a game record was deleted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteReason {
    /// A terminal stage was entered
    Terminal,
    /// The chat can no longer be reached
    Unreachable,
}

/// How a player left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationCause {
    /// Jailed by the day vote
    Vote,
    /// Shot during the night
    Shooting,
}

/// A discrete event emitted during engine operation.
///
/// Each variant is tagged with `"type"` when serialized to JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The engine has started running games.
    EngineStarted {
        /// When the engine started.
        timestamp: DateTime<Utc>,
        /// Number of games loaded.
        games: usize,
    },

    /// The engine has stopped.
    EngineStopped {
        /// When the engine stopped.
        timestamp: DateTime<Utc>,
        /// Human-readable stop reason.
        reason: String,
    },

    /// A game entered a new stage.
    StageEntered {
        /// When the transition was committed.
        timestamp: DateTime<Utc>,
        /// Game that moved.
        game_id: GameId,
        /// Stage the game left.
        from: Stage,
        /// Stage the game entered.
        to: Stage,
        /// Registered name of the entered stage.
        stage_name: String,
    },

    /// A game record was deleted.
    GameDeleted {
        /// When the record was deleted.
        timestamp: DateTime<Utc>,
        /// Deleted game.
        game_id: GameId,
        /// Stage the game was at or entering.
        stage: Stage,
        /// Why the record was deleted.
        reason: DeleteReason,
    },

    /// A player was eliminated.
    PlayerEliminated {
        /// When the elimination was committed.
        timestamp: DateTime<Utc>,
        /// Game the player belongs to.
        game_id: GameId,
        /// Chat-platform id of the player.
        player: PlayerId,
        /// How the player was eliminated.
        cause: EliminationCause,
    },

    /// A timer sweep finished.
    SweepCompleted {
        /// When the sweep finished.
        timestamp: DateTime<Utc>,
        /// Games found due.
        due: usize,
        /// Games that actually moved.
        advanced: usize,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) increments the sequence counter,
/// serializes the event as one JSON line, and flushes the writer.
/// Serialization and I/O failures are dropped.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    ///
    /// Stdout is left to the console messenger.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use super::*;

    /// In-memory writer for capturing emitter output.
    #[derive(Clone, Default)]
    pub(crate) struct TestWriter(Arc<StdMutex<Vec<u8>>>);

    impl TestWriter {
        pub(crate) fn lines(&self) -> Vec<serde_json::Value> {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf)
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn entered() -> Event {
        Event::StageEntered {
            timestamp: DateTime::parse_from_rfc3339("2026-03-01T21:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            game_id: GameId::new("g1"),
            from: 0,
            to: 1,
            stage_name: "vote".to_owned(),
        }
    }

    #[test]
    fn emitter_writes_tagged_jsonl() {
        let tw = TestWriter::default();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(entered());

        let lines = tw.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["type"], "StageEntered");
        assert_eq!(lines[0]["game_id"], "g1");
        assert_eq!(lines[0]["stage_name"], "vote");
        assert_eq!(lines[0]["sequence"], 0);
        assert!(lines[0].get("event").is_none());
    }

    #[test]
    fn emitter_increments_sequence() {
        let tw = TestWriter::default();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(entered());
        emitter.emit(Event::GameDeleted {
            timestamp: Utc::now(),
            game_id: GameId::new("g1"),
            stage: -3,
            reason: DeleteReason::Terminal,
        });

        assert_eq!(emitter.event_count(), 2);
        let lines = tw.lines();
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["reason"], "terminal");
    }

    #[test]
    fn elimination_cause_is_snake_case() {
        let json = serde_json::to_value(Event::PlayerEliminated {
            timestamp: Utc::now(),
            game_id: GameId::new("g"),
            player: 42,
            cause: EliminationCause::Shooting,
        })
        .unwrap();
        assert_eq!(json["cause"], "shooting");
        assert_eq!(json["player"], 42);
    }
}
