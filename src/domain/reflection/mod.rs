//! Reflection Domain Module
//!
//! The conversation state machine that drives multi-turn reflective dialogue:
//! the probing loop, the summarization/self-correction retry loop, and the
//! goal-capture sub-flow.
//!
//! # Architecture
//!
//! - **DialogueState**: the record threaded through every step; owned by the
//!   caller between turns (the server is stateless)
//! - **Stage functions**: pure transformations from (state, gateway) to an
//!   updated state
//! - **Transition rules**: pure decision functions selecting the next stage,
//!   with counter-bounded loops
//! - **SessionDriver**: advances one turn to its next pause point
//!
//! # Example
//!
//! ```ignore
//! let driver = SessionDriver::new(&gateway, SessionLimits::default());
//! let outcome = driver.run_turn(TurnInput::Initiate { topic: None }).await?;
//! assert!(!outcome.is_final_turn);
//! ```

pub mod driver;
pub mod errors;
pub mod prompts;
pub mod routing;
pub mod stages;
pub mod state;

pub use driver::{SessionDriver, TurnInput, TurnOutcome};
pub use errors::ReflectionError;
pub use routing::{CorrectionDecision, PendingInput, ProbeDecision};
pub use state::{DialoguePhase, DialogueState, HistoryEntry, Sentiment, SessionLimits, Speaker};
