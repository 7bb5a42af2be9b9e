//! CLI argument definitions.
//!
//! All Clap derive structs for `nightwatch` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

// ============================================================================
// Root CLI
// ============================================================================

/// Stage-sequencing engine for chat-hosted Mafia games.
#[derive(Parser, Debug)]
#[command(name = "nightwatch", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv nightwatch debug, -vvv nightwatch trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "NIGHTWATCH_LOG_FORMAT")]
    pub log_format: LogFormatChoice,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "NIGHTWATCH_COLOR")]
    pub color: ColorChoice,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the timer sweep over a file of games.
    Run(RunArgs),

    /// Print the stage table.
    Stages(StagesArgs),

    /// Validate a configuration file.
    Validate(ValidateArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON file holding an array of game records.
    #[arg(short, long, env = "NIGHTWATCH_GAMES")]
    pub games: PathBuf,

    /// Path to YAML configuration file.
    #[arg(short, long, env = "NIGHTWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the event stream (JSONL) to this file instead of stderr.
    #[arg(long, env = "NIGHTWATCH_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on this port.
    #[arg(long, env = "NIGHTWATCH_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Sweep once and exit.
    #[arg(long)]
    pub once: bool,

    /// Write the remaining games back to this file on exit.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `stages`.
#[derive(Args, Debug)]
pub struct StagesArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "NIGHTWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration file to validate.
    pub config: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Log format choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormatChoice {
    /// Human-readable lines.
    #[default]
    Human,
    /// JSON lines.
    Json,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_requires_games() {
        assert!(Cli::try_parse_from(["nightwatch", "run"]).is_err());
        let cli = Cli::try_parse_from(["nightwatch", "run", "--games", "g.json", "--once"]);
        assert!(cli.is_ok(), "Failed to parse: {cli:?}");
    }

    #[test]
    fn run_options() {
        let cli = Cli::try_parse_from([
            "nightwatch",
            "run",
            "-g",
            "g.json",
            "-c",
            "c.yaml",
            "--events-file",
            "e.jsonl",
            "--metrics-port",
            "9100",
            "-o",
            "out.json",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.metrics_port, Some(9100));
        assert!(!args.once);
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn validate_requires_file() {
        assert!(Cli::try_parse_from(["nightwatch", "validate"]).is_err());
        let cli = Cli::try_parse_from(["nightwatch", "validate", "c.yaml", "--strict"]).unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert!(args.strict);
    }

    #[test]
    fn stages_json_format() {
        let cli = Cli::try_parse_from(["nightwatch", "stages", "--format", "json"]).unwrap();
        let Commands::Stages(args) = cli.command else {
            panic!("expected stages");
        };
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn help_and_version() {
        let err = Cli::try_parse_from(["nightwatch", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        let err = Cli::try_parse_from(["nightwatch", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn verbose_count_and_quiet() {
        let cli = Cli::try_parse_from(["nightwatch", "-vvv", "-q", "version"]).unwrap();
        assert_eq!(cli.verbose, 3);
        assert!(cli.quiet);
    }

    #[test]
    fn color_choices_parse() {
        for variant in ["auto", "always", "never"] {
            let cli = Cli::try_parse_from(["nightwatch", "--color", variant, "version"]);
            assert!(cli.is_ok(), "Failed to parse color={variant}");
        }
    }
}
