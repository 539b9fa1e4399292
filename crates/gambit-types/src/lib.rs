//! Shared domain types for the Gambit workspace.

pub mod board;
pub mod config;
pub mod events;
pub mod game;
pub mod geometry;
pub mod telemetry;
pub mod time_control;

mod errors;

pub use errors::{GambitError, Result};
