//! Session Driver
//!
//! Executes one turn: advances the dialogue state through stage functions and
//! transition rules until a stage needs new user input or the session is
//! terminal, then returns control to the caller. The driver runs stages
//! strictly sequentially and never crosses more than one awaiting-input
//! boundary per call.

use tracing::{info, instrument};

use crate::ports::AiGateway;

use super::errors::ReflectionError;
use super::routing::{self, CorrectionDecision, PendingInput, ProbeDecision};
use super::stages;
use super::state::{DialogueState, SessionLimits};

/// Input for one external turn.
#[derive(Debug, Clone)]
pub enum TurnInput {
    /// Start a fresh session, optionally around a topic.
    Initiate { topic: Option<String> },
    /// Resume an existing session with the user's answer.
    Continue {
        state: DialogueState,
        user_input: String,
    },
}

/// Result of one turn: the state to hand back to the caller plus the text to
/// present.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub state: DialogueState,
    pub agent_response: String,
    pub is_final_turn: bool,
}

impl TurnOutcome {
    /// Build the outcome from a paused or concluded state.
    ///
    /// The driver upholds the pause-point invariant here: a non-terminal
    /// state without a pending question is itself treated as an internal
    /// failure rather than returned half-finished.
    fn from_state(mut state: DialogueState) -> Self {
        if let Some(message) = state.error_message.clone() {
            return Self {
                state,
                agent_response: message,
                is_final_turn: true,
            };
        }

        if state.actionable_goal.is_some() {
            let confirmation = state
                .history
                .last()
                .map(|entry| entry.text.clone())
                .unwrap_or_else(|| stages::GOAL_CONFIRMATION.to_string());
            return Self {
                state,
                agent_response: confirmation,
                is_final_turn: true,
            };
        }

        match state.current_question.clone() {
            Some(question) => Self {
                state,
                agent_response: question,
                is_final_turn: false,
            },
            None => {
                let message =
                    "An unexpected internal state was reached. Please start a new session."
                        .to_string();
                state.error_message = Some(message.clone());
                Self {
                    state,
                    agent_response: message,
                    is_final_turn: true,
                }
            }
        }
    }
}

/// Drives a reflection session one turn at a time.
///
/// Holds no session state of its own; everything lives in the
/// [`DialogueState`] owned by the caller.
pub struct SessionDriver<'a> {
    gateway: &'a dyn AiGateway,
    limits: SessionLimits,
}

impl<'a> SessionDriver<'a> {
    pub fn new(gateway: &'a dyn AiGateway, limits: SessionLimits) -> Self {
        Self { gateway, limits }
    }

    /// Run one turn to its next pause point or conclusion.
    ///
    /// The only errors returned are input-routing rejections; all stage
    /// failures conclude the session via `error_message` instead.
    #[instrument(skip_all)]
    pub async fn run_turn(&self, input: TurnInput) -> Result<TurnOutcome, ReflectionError> {
        match input {
            TurnInput::Initiate { topic } => {
                info!(topic = topic.as_deref(), "initiating session");
                let state = stages::initiate(DialogueState::new(topic));
                Ok(TurnOutcome::from_state(state))
            }
            TurnInput::Continue { state, user_input } => {
                match routing::classify_pending_input(&state) {
                    PendingInput::None if state.is_terminal() => {
                        Err(ReflectionError::SessionConcluded)
                    }
                    PendingInput::None => Err(ReflectionError::NoPendingQuestion),
                    PendingInput::GoalAnswer => {
                        let state = Self::consume_input(state, user_input);
                        Ok(TurnOutcome::from_state(stages::capture_goal(state)))
                    }
                    PendingInput::ProbeAnswer => {
                        let state = Self::consume_input(state, user_input);
                        let state = stages::classify_sentiment(state, self.gateway).await;
                        self.advance_after_answer(state).await
                    }
                }
            }
        }
    }

    /// Append the user's answer and clear the answered question.
    fn consume_input(mut state: DialogueState, user_input: String) -> DialogueState {
        state.push_user(user_input);
        state.current_question = None;
        state
    }

    /// After a probe answer: keep probing, or run summarization through to
    /// the goal question.
    async fn advance_after_answer(
        &self,
        state: DialogueState,
    ) -> Result<TurnOutcome, ReflectionError> {
        match routing::probe_or_summarize(&state, self.gateway, &self.limits).await {
            ProbeDecision::Probe => {
                let state = stages::probe(state, self.gateway).await;
                Ok(TurnOutcome::from_state(state))
            }
            ProbeDecision::Summarize => self.run_summary_loop(state).await,
        }
    }

    /// The bounded summarize / check / correct cycle, ending at the goal
    /// question or a terminal state.
    async fn run_summary_loop(
        &self,
        mut state: DialogueState,
    ) -> Result<TurnOutcome, ReflectionError> {
        loop {
            state = stages::summarize(state, self.gateway).await;
            if state.is_terminal() {
                return Ok(TurnOutcome::from_state(state));
            }

            state = stages::check_summary(state, self.gateway).await;
            if state.is_terminal() {
                return Ok(TurnOutcome::from_state(state));
            }

            match routing::after_summary_check(&state, &self.limits) {
                CorrectionDecision::Approved => {
                    let state = stages::suggest_goal(state, self.gateway).await;
                    return Ok(TurnOutcome::from_state(state));
                }
                CorrectionDecision::Retry => {
                    state.correction_attempts += 1;
                    info!(
                        attempt = state.correction_attempts,
                        "retrying summary with feedback"
                    );
                }
                CorrectionDecision::Exhausted => {
                    // counter arrives from the wire, so it may be arbitrary
                    let attempts = state.correction_attempts.saturating_add(1);
                    state.needs_correction = false;
                    state.error_message = Some(format!(
                        "Summary failed validation after {} attempts; the last attempt is \
                         retained but may be incomplete.",
                        attempts
                    ));
                    return Ok(TurnOutcome::from_state(state));
                }
            }
        }
    }
}
