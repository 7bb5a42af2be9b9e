//! Error types for `nightwatch`
//!
//! One top-level error for the CLI plus one enum per subsystem. Engine code
//! never surfaces these to players; they end up in logs or exit codes.

use std::path::PathBuf;
use thiserror::Error;

use crate::game::{GameId, Stage};

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `nightwatch` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Store error (game file unreadable, inconsistent records)
    pub const STORE_ERROR: i32 = 4;

    /// Stage engine error
    pub const STAGE_ERROR: i32 = 5;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `nightwatch` operations.
#[derive(Debug, Error)]
pub enum NightwatchError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Document store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Stage engine error
    #[error(transparent)]
    Stage(#[from] StageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl NightwatchError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Store(_) | Self::Json(_) => ExitCode::STORE_ERROR,
            Self::Stage(_) => ExitCode::STAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Dotted path to the problematic field (e.g., "timings.vote")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Prevents the configuration from being used
    Error,
    /// Reported, but the configuration still loads
    Warning,
}

// ============================================================================
// Delivery Errors
// ============================================================================

/// Failures reported by a [`Messenger`](crate::messaging::Messenger).
///
/// The engine only distinguishes two kinds: a chat that can never be
/// reached again, and everything else.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The chat is permanently unreachable (bot kicked, chat deleted).
    #[error("recipient unreachable: {0}")]
    Unreachable(String),

    /// Any other delivery failure (rate limit, network, bad request).
    #[error("delivery failed: {0}")]
    Other(String),
}

impl DeliveryError {
    /// Whether this failure means the chat can no longer be served.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

// ============================================================================
// Store Errors
// ============================================================================

/// Document store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Game record does not exist
    #[error("game not found: {0}")]
    NotFound(GameId),

    /// A game with the same id is already stored
    #[error("duplicate game id: {0}")]
    Duplicate(GameId),

    /// An update referenced a player index outside the roster
    #[error("player index {index} out of range for game {game} ({len} players)")]
    PlayerOutOfRange {
        /// Game being updated
        game: GameId,
        /// Offending index
        index: usize,
        /// Roster length
        len: usize,
    },
}

// ============================================================================
// Stage Errors
// ============================================================================

/// Errors raised while running a stage's entry action.
#[derive(Debug, Error)]
pub enum StageError {
    /// The target stage has no registered descriptor
    #[error("stage {stage} not registered (game {game})")]
    NotFound {
        /// Game being advanced
        game: GameId,
        /// Missing stage number
        stage: Stage,
    },

    /// Message delivery failed
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Store read/write failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StageError {
    /// Whether the underlying cause is an unreachable chat.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Delivery(DeliveryError::Unreachable(_)))
    }
}

// ============================================================================
// Handler Errors
// ============================================================================

/// Rejections and failures of player actions.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Action is not accepted during the current stage
    #[error("action not allowed at stage {actual} (expected {expected})")]
    WrongStage {
        /// Stage the action belongs to
        expected: Stage,
        /// Stage the game is at
        actual: Stage,
    },

    /// Acting player is not in the roster
    #[error("unknown player {0}")]
    UnknownPlayer(usize),

    /// Acting player or target is dead
    #[error("player {0} is not alive")]
    NotAlive(usize),

    /// Acting player's role may not perform this action
    #[error("player {0} may not perform this action")]
    NotPermitted(usize),

    /// Acting player already acted this stage
    #[error("player {0} already acted this stage")]
    AlreadyPlayed(usize),

    /// The game moved on or disappeared while the action was applied
    #[error("game changed before the action could be applied")]
    Conflict,

    /// Store read/write failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `nightwatch` operations.
pub type Result<T> = std::result::Result<T, NightwatchError>;

// ============================================================================
// Tests
// ============================================================================
