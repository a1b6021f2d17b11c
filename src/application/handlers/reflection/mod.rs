//! Reflection session handlers.

pub mod process_turn;

pub use process_turn::{
    ProcessTurnCommand, ProcessTurnError, ProcessTurnHandler, ProcessTurnResult,
};
