//! `nightwatch` - stage sequencing engine for chat-hosted Mafia games
//!
//! Games live in a [`store::GameStore`]. The [`stage::StageEngine`] moves
//! them through the stage table, running each stage's entry action, and
//! [`stage::Scheduler`] advances games whose stage deadline has passed.
//! Player button presses enter through [`handlers::dispatch`].

pub mod cli;
pub mod config;
pub mod error;
pub mod game;
pub mod handlers;
pub mod lang;
pub mod messaging;
pub mod observability;
pub mod stage;
pub mod store;
