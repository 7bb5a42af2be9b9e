//! Metrics collection for `nightwatch`.
//!
//! Prometheus-compatible counters and gauges. Stage labels come from the
//! registry, never from player input, so label cardinality is bounded by
//! the number of registered stages.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::NightwatchError;
use crate::observability::events::{DeleteReason, EliminationCause};

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without an
/// HTTP endpoint.
///
/// # Errors
///
/// Returns `NightwatchError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), NightwatchError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| NightwatchError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "nightwatch_transitions_total",
        "Committed stage transitions by target stage"
    );
    describe_counter!(
        "nightwatch_games_deleted_total",
        "Game records deleted by the engine"
    );
    describe_counter!(
        "nightwatch_eliminations_total",
        "Players eliminated by vote or shooting"
    );
    describe_counter!(
        "nightwatch_action_failures_total",
        "Stage entry actions that failed"
    );
    describe_gauge!(
        "nightwatch_games_due",
        "Games found due by the last timer sweep"
    );
}

/// Records a committed transition into `stage`.
pub fn record_transition(stage: &'static str) {
    counter!("nightwatch_transitions_total", "stage" => stage).increment(1);
}

/// Records a deleted game.
pub fn record_game_deleted(reason: DeleteReason) {
    let reason = match reason {
        DeleteReason::Terminal => "terminal",
        DeleteReason::Unreachable => "unreachable",
    };
    counter!("nightwatch_games_deleted_total", "reason" => reason).increment(1);
}

/// Records an eliminated player.
pub fn record_elimination(cause: EliminationCause) {
    let cause = match cause {
        EliminationCause::Vote => "vote",
        EliminationCause::Shooting => "shooting",
    };
    counter!("nightwatch_eliminations_total", "cause" => cause).increment(1);
}

/// Records a failed entry action of `stage`.
pub fn record_action_failure(stage: &'static str) {
    counter!("nightwatch_action_failures_total", "stage" => stage).increment(1);
}

/// Sets the number of games found due by the last sweep.
#[allow(clippy::cast_precision_loss)]
pub fn set_games_due(count: usize) {
    gauge!("nightwatch_games_due").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_transition("vote");
        record_game_deleted(DeleteReason::Unreachable);
        record_elimination(EliminationCause::Vote);
        record_action_failure("night");
        set_games_due(3);
    }
}
