//! Engine configuration.
//!
//! Loads stage timings, the sweep interval and message templates from YAML,
//! with `${VAR}` expansion before parsing and semantic validation after.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, LoadResult, LoadWarning, env_or};
pub use schema::{DiscussionTiming, EngineConfig, SweepConfig, TimingConfig};
pub use validation::{ValidationResult, Validator};
