//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod reflection;

pub use reflection::{ProcessTurnCommand, ProcessTurnError, ProcessTurnHandler, ProcessTurnResult};
