//! CLI command dispatch and handlers.

pub mod run;
pub mod stages;
pub mod validate;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::config::{ConfigLoader, EngineConfig};
use crate::error::NightwatchError;

/// Dispatch a parsed CLI invocation to its command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), NightwatchError> {
    match cli.command {
        Commands::Run(args) => run::run(&args, cancel).await,
        Commands::Stages(args) => stages::run(&args),
        Commands::Validate(args) => validate::run(&args),
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads `path`, or the defaults when no file is given, logging warnings.
fn load_config(path: Option<&Path>) -> Result<Arc<EngineConfig>, NightwatchError> {
    let Some(path) = path else {
        return Ok(Arc::new(EngineConfig::default()));
    };
    tracing::info!(config = %path.display(), "loading configuration");
    let loaded = ConfigLoader::new().load(path)?;
    for warning in &loaded.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    Ok(loaded.config)
}
