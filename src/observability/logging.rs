//! Logging initialization for `nightwatch`.
//!
//! Structured logging via `tracing` with human-readable and JSON output,
//! `-v` verbosity, and an environment override via `NIGHTWATCH_LOG_LEVEL`.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable that overrides the verbosity flags.
pub const LOG_LEVEL_ENV: &str = "NIGHTWATCH_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Crate target that stage transitions are logged under.
const STAGE_TARGET: &str = "nightwatch::stage";

/// Builds the filter directives for a `-v` count.
///
/// Dependencies follow the bare level. Stage transitions are always shown
/// at `info` or finer so a quiet `run` still reports games moving, and the
/// two finest levels only open up the `nightwatch` crate itself.
#[must_use]
pub fn default_directives(verbosity: u8) -> String {
    match verbosity {
        0 => format!("warn,{STAGE_TARGET}=info"),
        1 => "info".to_string(),
        2 => "info,nightwatch=debug".to_string(),
        _ => "debug,nightwatch=trace".to_string(),
    }
}

/// Initializes the global tracing subscriber.
///
/// A valid `NIGHTWATCH_LOG_LEVEL` takes precedence over `verbosity`; an
/// unparsable one falls back to the verbosity directives.
/// Uses `try_init()`, so repeated calls are ignored.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    let show_target = verbosity >= 2;

    let use_ansi = match color {
        ColorChoice::Auto => {
            std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    match format {
        LogFormat::Human => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(use_ansi)
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
