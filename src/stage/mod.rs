//! Stage sequencing.
//!
//! - [`registry`] - the immutable table of stages
//! - [`duration`] - fixed and computed stage durations
//! - [`engine`] - the transition algorithm
//! - [`actions`] - what happens when a stage is entered
//! - [`sweep`] - the timer sweep over due games

pub mod actions;
pub mod duration;
pub mod engine;
pub mod registry;
pub mod sweep;

pub use duration::StageDuration;
pub use engine::{StageEngine, Transition};
pub use registry::{StageAction, StageDescriptor, StageRegistry};
pub use sweep::{Scheduler, SweepReport};

use crate::game::Stage;

/// Players take their role cards.
pub const DEAL_CARDS: Stage = -4;
/// Terminal: the cards were not taken in time.
pub const CARDS_NOT_TAKEN: Stage = -3;
/// The don sets the shooting order.
pub const SET_ORDER: Stage = -2;
/// The mafia collects the order.
pub const GET_ORDER: Stage = -1;
/// Morning and day discussion; first stage of the cycle.
pub const DISCUSSION: Stage = 0;
/// Day vote.
pub const VOTE: Stage = 1;
/// Vote resolution and last words of the jailed player.
pub const LAST_WORDS_CRIMINAL: Stage = 2;
/// Night falls.
pub const NIGHT: Stage = 3;
/// The armed players shoot.
pub const SHOOTING: Stage = 4;
/// The don checks a player.
pub const DON_CHECK: Stage = 5;
/// The sheriff checks a player.
pub const SHERIFF_CHECK: Stage = 6;
/// Shooting resolution and last words of the victim; last stage of the cycle.
pub const LAST_WORDS_VICTIM: Stage = 7;
