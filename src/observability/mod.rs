//! Observability for `nightwatch`.
//!
//! Logging, metrics, and the structured event stream used to follow games
//! through their stages.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{DeleteReason, EliminationCause, Event, EventEmitter};
pub use logging::{LogFormat, init_logging};
pub use metrics::init_metrics;
