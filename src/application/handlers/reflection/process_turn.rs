//! ProcessTurnHandler - Advance a reflective session by one turn

use std::sync::Arc;

use crate::domain::reflection::{
    DialogueState, ReflectionError, SessionDriver, SessionLimits, TurnInput,
};
use crate::ports::AiGateway;

/// Command to process one turn of a reflective session.
///
/// A command without `current_state` starts a new session; a command with
/// `current_state` continues it and must carry non-empty `user_input`.
#[derive(Debug, Clone)]
pub struct ProcessTurnCommand {
    pub topic: Option<String>,
    pub user_input: Option<String>,
    pub current_state: Option<DialogueState>,
}

/// Result of processing a turn.
#[derive(Debug, Clone)]
pub struct ProcessTurnResult {
    /// Message to show the user for this turn.
    pub agent_response: String,
    /// Updated state the caller must send back on the next turn.
    pub next_state: DialogueState,
    /// True when the session has concluded (goal captured or failed).
    pub is_final_turn: bool,
}

/// Error type for processing turns
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessTurnError {
    /// Continuation turn arrived without user input
    MissingUserInput,
    /// The session has already concluded
    SessionConcluded,
    /// The session has no outstanding question to answer
    NoPendingQuestion,
}

impl std::fmt::Display for ProcessTurnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessTurnError::MissingUserInput => {
                write!(f, "user_input is required when continuing a session")
            }
            ProcessTurnError::SessionConcluded => {
                write!(f, "Session has already concluded; start a new session")
            }
            ProcessTurnError::NoPendingQuestion => {
                write!(f, "Session has no pending question to answer")
            }
        }
    }
}

impl std::error::Error for ProcessTurnError {}

impl From<ReflectionError> for ProcessTurnError {
    fn from(err: ReflectionError) -> Self {
        match err {
            ReflectionError::SessionConcluded => ProcessTurnError::SessionConcluded,
            ReflectionError::NoPendingQuestion => ProcessTurnError::NoPendingQuestion,
        }
    }
}

/// Handler for advancing reflective sessions.
pub struct ProcessTurnHandler {
    gateway: Arc<dyn AiGateway>,
    limits: SessionLimits,
}

impl ProcessTurnHandler {
    pub fn new(gateway: Arc<dyn AiGateway>, limits: SessionLimits) -> Self {
        Self { gateway, limits }
    }

    pub async fn handle(
        &self,
        cmd: ProcessTurnCommand,
    ) -> Result<ProcessTurnResult, ProcessTurnError> {
        let input = self.validate(cmd)?;

        let driver = SessionDriver::new(self.gateway.as_ref(), self.limits);
        let outcome = driver.run_turn(input).await?;

        Ok(ProcessTurnResult {
            agent_response: outcome.agent_response,
            next_state: outcome.state,
            is_final_turn: outcome.is_final_turn,
        })
    }

    /// Decides between initiation and continuation, rejecting malformed input.
    fn validate(&self, cmd: ProcessTurnCommand) -> Result<TurnInput, ProcessTurnError> {
        match cmd.current_state {
            None => Ok(TurnInput::Initiate { topic: cmd.topic }),
            Some(state) => {
                let user_input = cmd
                    .user_input
                    .filter(|input| !input.trim().is_empty())
                    .ok_or(ProcessTurnError::MissingUserInput)?;
                Ok(TurnInput::Continue { state, user_input })
            }
        }
    }
}
