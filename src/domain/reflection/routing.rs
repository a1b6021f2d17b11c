//! Transition Rules - the state machine core.
//!
//! Pure decision functions that inspect the dialogue state and select the
//! next stage. Every loop is bounded by an explicit counter checked *before*
//! the loop body re-executes, and the counter always takes precedence over
//! any model judgment, so termination never depends on gateway behavior.

use tracing::{info, warn};

use crate::ports::{AiGateway, CompletionRequest};

use super::prompts;
use super::state::{DialogueState, SessionLimits};

/// Minimum history length before the depth judgment is consulted.
const MIN_HISTORY_FOR_DEPTH_CHECK: usize = 3;

/// Which stage consumes the next incoming user input.
///
/// Consulted exactly once per turn so the "is this a probe answer or the
/// goal answer" decision lives in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
    /// The user is answering a probe (or the opening) question.
    ProbeAnswer,
    /// The user is answering the actionable-goal question.
    GoalAnswer,
    /// No input is expected (terminal or never-asked state).
    None,
}

/// Route an incoming user input to the stage that should consume it.
pub fn classify_pending_input(state: &DialogueState) -> PendingInput {
    if state.is_terminal() {
        PendingInput::None
    } else if state.goal_setting_active {
        PendingInput::GoalAnswer
    } else if state.current_question.is_some() {
        PendingInput::ProbeAnswer
    } else {
        PendingInput::None
    }
}

/// Decision after a user's probe answer: keep probing or summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeDecision {
    Probe,
    Summarize,
}

/// Decide whether to continue the probing loop.
///
/// Policy: the probe counter is a hard cap checked first. Below the cap, a
/// short history always continues; otherwise a model judgment may end the
/// loop early (a leading YES means the reflection is deep enough). A failed
/// or unparseable judgment continues probing — the model can shorten the
/// loop but never extend it past the cap.
pub async fn probe_or_summarize(
    state: &DialogueState,
    gateway: &dyn AiGateway,
    limits: &SessionLimits,
) -> ProbeDecision {
    if state.probe_count >= limits.max_probes {
        warn!(
            probe_count = state.probe_count,
            max_probes = limits.max_probes,
            "max probes reached, forcing summarization"
        );
        return ProbeDecision::Summarize;
    }

    if state.history.len() < MIN_HISTORY_FOR_DEPTH_CHECK {
        info!("history too short for depth check, continuing probing");
        return ProbeDecision::Probe;
    }

    let request = CompletionRequest::new(prompts::depth_prompt(&state.history))
        .with_system_prompt(prompts::SYSTEM_PROMPT)
        .with_max_tokens(8)
        .with_temperature(0.0);

    match gateway.complete(request).await {
        Ok(response) if response.content.trim().to_uppercase().starts_with("YES") => {
            info!("depth judgment: reflection sufficient, summarizing");
            ProbeDecision::Summarize
        }
        Ok(response) => {
            info!(reply = %response.content, "depth judgment: insufficient, continuing");
            ProbeDecision::Probe
        }
        Err(err) => {
            warn!(error = %err, "depth check failed, defaulting to continue probing");
            ProbeDecision::Probe
        }
    }
}

/// Decision after a summary quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionDecision {
    /// Quality check passed; move on to goal suggestion.
    Approved,
    /// Quality check failed with retry budget remaining.
    Retry,
    /// Quality check failed and the retry budget is spent.
    Exhausted,
}

/// Decide where the correction loop goes after a quality check.
///
/// The attempt counter is checked before another retry is granted, so the
/// loop is bounded regardless of what the checker returns.
pub fn after_summary_check(state: &DialogueState, limits: &SessionLimits) -> CorrectionDecision {
    if !state.needs_correction {
        CorrectionDecision::Approved
    } else if state.correction_attempts < limits.max_correction_attempts {
        CorrectionDecision::Retry
    } else {
        CorrectionDecision::Exhausted
    }
}
