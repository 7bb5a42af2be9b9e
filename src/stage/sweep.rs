//! Timer sweep.
//!
//! Stage deadlines are persisted in the game records, not held as
//! in-process timers. The scheduler periodically asks the store for games
//! whose deadline has passed and advances each of them by one stage, so
//! timing survives restarts as long as sweeping resumes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::observability::events::Event;
use crate::observability::metrics;

use super::engine::StageEngine;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Games whose deadline had passed
    pub due: usize,
    /// Games that moved or were deleted
    pub advanced: usize,
}

/// Periodic sweep over due games.
#[derive(Debug)]
pub struct Scheduler {
    engine: Arc<StageEngine>,
    interval: Duration,
}

impl Scheduler {
    /// Creates a scheduler ticking every `interval`.
    #[must_use]
    pub const fn new(engine: Arc<StageEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Advances every game due at `now` by one stage.
    ///
    /// Games are advanced concurrently; they share no state.
    ///
    /// # Errors
    ///
    /// Returns the store error if the due games cannot be listed.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<SweepReport, StoreError> {
        let due = self.engine.store().due_games(now).await?;
        metrics::set_games_due(due.len());
        if due.is_empty() {
            return Ok(SweepReport::default());
        }

        let results = join_all(due.iter().map(|game| self.engine.transition(game, 1))).await;
        let report = SweepReport {
            due: due.len(),
            advanced: results.iter().filter(|t| t.is_change()).count(),
        };

        debug!(due = report.due, advanced = report.advanced, "sweep finished");
        self.engine.events().emit(Event::SweepCompleted {
            timestamp: Utc::now(),
            due: report.due,
            advanced: report.advanced,
        });
        Ok(report)
    }

    /// Sweeps until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval = ?self.interval, "timer sweep started");
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("timer sweep cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.sweep_once(Utc::now()).await {
                        warn!(error = %e, "timer sweep failed");
                    }
                }
            }
        }
    }

    /// Spawns [`run`](Self::run) on the runtime.
    pub fn start(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.run(cancel).await })
    }
}
