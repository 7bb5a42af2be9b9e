//! `validate`: checks a configuration file.

use serde_json::json;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::ConfigLoader;
use crate::error::{ConfigError, NightwatchError, Severity, ValidationIssue};

/// Validate a configuration file and report what was found.
///
/// # Errors
///
/// Returns the configuration error if loading fails, or a validation error
/// if `--strict` is set and warnings were reported.
pub fn run(args: &ValidateArgs) -> Result<(), NightwatchError> {
    tracing::info!(file = %args.config.display(), "validating configuration");
    let loaded = match ConfigLoader::new().load(&args.config) {
        Ok(loaded) => loaded,
        Err(ConfigError::ValidationError { path, errors }) => {
            for issue in &errors {
                eprintln!("{issue}");
            }
            return Err(ConfigError::ValidationError { path, errors }.into());
        }
        Err(e) => return Err(e.into()),
    };

    let warnings: Vec<ValidationIssue> = loaded
        .warnings
        .into_iter()
        .map(|w| ValidationIssue {
            path: w.location.unwrap_or_default(),
            message: w.message,
            severity: Severity::Warning,
        })
        .collect();

    match args.format {
        OutputFormat::Human => {
            for warning in &warnings {
                println!("{warning}");
            }
            println!(
                "{}: valid ({} warning{})",
                args.config.display(),
                warnings.len(),
                if warnings.len() == 1 { "" } else { "s" }
            );
        }
        OutputFormat::Json => {
            let report = json!({
                "file": args.config.display().to_string(),
                "valid": true,
                "warnings": warnings
                    .iter()
                    .map(|w| json!({ "path": w.path, "message": w.message }))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(ConfigError::ValidationError {
            path: args.config.display().to_string(),
            errors: warnings,
        }
        .into());
    }
    Ok(())
}
