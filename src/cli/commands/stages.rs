//! `stages`: prints the stage table.

use serde::Serialize;

use crate::cli::args::{OutputFormat, StagesArgs};
use crate::error::NightwatchError;
use crate::stage::{StageDuration, StageRegistry};

use super::load_config;

#[derive(Debug, Serialize)]
struct StageRow {
    number: i32,
    name: &'static str,
    duration: String,
    terminal: bool,
}

/// Print the registry built from the configured timings.
///
/// # Errors
///
/// Returns a configuration error if `--config` cannot be loaded.
pub fn run(args: &StagesArgs) -> Result<(), NightwatchError> {
    let config = load_config(args.config.as_deref())?;
    let rows = rows(&StageRegistry::standard(&config.timings));

    match args.format {
        OutputFormat::Human => {
            for row in &rows {
                let terminal = if row.terminal { "  (ends the game)" } else { "" };
                println!(
                    "{:>3}  {:<20} {}{terminal}",
                    row.number, row.name, row.duration
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(())
}

fn rows(registry: &StageRegistry) -> Vec<StageRow> {
    registry
        .iter()
        .map(|d| StageRow {
            number: d.number,
            name: d.name(),
            duration: match &d.duration {
                Some(StageDuration::Fixed(fixed)) => humantime::format_duration(*fixed).to_string(),
                Some(StageDuration::Computed(_)) => "computed".to_string(),
                None => "-".to_string(),
            },
            terminal: d.terminal,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;

    #[test]
    fn rows_describe_durations() {
        let rows = rows(&StageRegistry::standard(&TimingConfig::default()));
        assert_eq!(rows.len(), 12);
        let by_name = |name: &str| rows.iter().find(|r| r.name == name).unwrap();
        assert_eq!(by_name("deal_cards").duration, "1m 30s");
        assert_eq!(by_name("discussion").duration, "computed");
        assert_eq!(by_name("cards_not_taken").duration, "-");
        assert!(by_name("cards_not_taken").terminal);
    }
}
