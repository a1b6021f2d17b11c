//! Stage Functions
//!
//! Each stage is a transformation from (state, gateway) to an updated state:
//! pure with respect to everything except the gateway call. A gateway call
//! that fails terminally is absorbed into `error_message` here — stages never
//! return errors and never panic, so the driver can treat any stage's output
//! as the next state unconditionally.

use tracing::{error, info, warn};

use crate::ports::{AiGateway, CompletionRequest, GatewayError};

use super::prompts;
use super::state::{DialogueState, Sentiment};

/// Fixed confirmation appended when the goal is captured.
pub const GOAL_CONFIRMATION: &str = "Great — I've noted that as your next step. Well done on \
taking the time to reflect today.";

/// Generation budget for conversational replies.
const QUESTION_MAX_TOKENS: u32 = 150;
/// Generation budget for summaries and critiques.
const SUMMARY_MAX_TOKENS: u32 = 400;

/// Initiator: open the session with a templated question.
///
/// No gateway call — the opener must succeed even when the provider is down.
pub fn initiate(mut state: DialogueState) -> DialogueState {
    if !state.history.is_empty() {
        warn!("initiator called with non-empty history, skipping");
        return state;
    }

    let question = prompts::initiation_question(state.topic.as_deref());
    info!(question = %question, "initiator opened session");

    state.push_agent(question.clone());
    state.current_question = Some(question);
    state
}

/// Sentiment-Tagger: classify the last user utterance.
///
/// Never fails the turn: any gateway error or unrecognized label resolves to
/// `Neutral`.
pub async fn classify_sentiment(
    mut state: DialogueState,
    gateway: &dyn AiGateway,
) -> DialogueState {
    let Some(utterance) = state.last_user_utterance().map(str::to_owned) else {
        warn!("no trailing user utterance, defaulting sentiment to neutral");
        state.last_sentiment = Some(Sentiment::Neutral);
        return state;
    };

    let request = CompletionRequest::new(prompts::sentiment_prompt(&utterance))
        .with_max_tokens(4)
        .with_temperature(0.0);

    let sentiment = match gateway.complete(request).await {
        Ok(response) => Sentiment::parse_or_neutral(&response.content),
        Err(err) => {
            warn!(error = %err, "sentiment classification failed, defaulting to neutral");
            Sentiment::Neutral
        }
    };

    info!(?sentiment, "sentiment classified");
    state.last_sentiment = Some(sentiment);
    state
}

/// Prober: generate one sentiment-framed follow-up question.
pub async fn probe(mut state: DialogueState, gateway: &dyn AiGateway) -> DialogueState {
    state.probe_count += 1;
    info!(probe_count = state.probe_count, "probing");

    let sentiment = state.last_sentiment.unwrap_or_default();
    let request = CompletionRequest::new(prompts::probe_prompt(&state.history, sentiment))
        .with_system_prompt(prompts::SYSTEM_PROMPT)
        .with_max_tokens(QUESTION_MAX_TOKENS)
        .with_temperature(0.7);

    match require_content(gateway.complete(request).await) {
        Ok(question) => {
            info!(question = %question, "prober generated question");
            state.push_agent(question.clone());
            state.current_question = Some(question);
        }
        Err(err) => fail_stage(&mut state, "generating a follow-up question", err),
    }
    state
}

/// Summarizer: condense the full history into a summary, addressing any
/// pending correction feedback exactly once.
pub async fn summarize(mut state: DialogueState, gateway: &dyn AiGateway) -> DialogueState {
    let feedback = state.correction_feedback.take();
    info!(
        attempt = state.correction_attempts.saturating_add(1),
        has_feedback = feedback.is_some(),
        "summarizing"
    );

    let request = CompletionRequest::new(prompts::summarize_prompt(
        &state.history,
        feedback.as_deref(),
    ))
    .with_system_prompt(prompts::SYSTEM_PROMPT)
    .with_max_tokens(SUMMARY_MAX_TOKENS)
    .with_temperature(0.5);

    match require_content(gateway.complete(request).await) {
        Ok(summary) => {
            info!("summary generated");
            state.summary = Some(summary);
        }
        Err(err) => fail_stage(&mut state, "generating the summary", err),
    }
    state
}

/// Corrector: judge the summary against the history.
///
/// A leading YES passes; a leading NO fails with the remainder stored as
/// feedback; anything unparseable fails closed with a canned feedback line.
/// Gateway failure is terminal here, unlike the sentiment default.
pub async fn check_summary(mut state: DialogueState, gateway: &dyn AiGateway) -> DialogueState {
    let Some(summary) = state.summary.clone() else {
        fail_stage(
            &mut state,
            "checking the summary",
            StageFailure::MissingInput("no summary to check"),
        );
        return state;
    };

    let request = CompletionRequest::new(prompts::check_summary_prompt(&state.history, &summary))
        .with_max_tokens(SUMMARY_MAX_TOKENS)
        .with_temperature(0.0);

    match gateway.complete(request).await {
        Ok(response) => {
            let verdict = response.content.trim();
            if verdict.to_uppercase().starts_with("YES") {
                info!("summary approved");
                state.needs_correction = false;
                state.correction_feedback = None;
            } else {
                let feedback = parse_check_feedback(verdict);
                warn!(feedback = %feedback, "summary needs correction");
                state.needs_correction = true;
                state.correction_feedback = Some(feedback);
            }
        }
        Err(err) => fail_stage(&mut state, "checking the summary", StageFailure::Gateway(err)),
    }
    state
}

/// Goal-Suggester: present the summary and ask for one actionable step.
pub async fn suggest_goal(mut state: DialogueState, gateway: &dyn AiGateway) -> DialogueState {
    let Some(summary) = state.summary.clone() else {
        fail_stage(
            &mut state,
            "suggesting a goal",
            StageFailure::MissingInput("no approved summary"),
        );
        return state;
    };

    let request = CompletionRequest::new(prompts::goal_prompt(&summary))
        .with_system_prompt(prompts::SYSTEM_PROMPT)
        .with_max_tokens(QUESTION_MAX_TOKENS)
        .with_temperature(0.7);

    match require_content(gateway.complete(request).await) {
        Ok(question) => {
            let message = format!(
                "Here is a summary of your reflection:\n\n{}\n\n{}",
                summary, question
            );
            info!("goal question generated");
            state.push_agent(message.clone());
            state.current_question = Some(message);
            state.goal_setting_active = true;
        }
        Err(err) => fail_stage(&mut state, "suggesting a goal", err),
    }
    state
}

/// Goal-Capturer: store the user's goal verbatim and close the session.
///
/// No gateway call; the capture cannot fail once a user utterance exists.
pub fn capture_goal(mut state: DialogueState) -> DialogueState {
    let Some(goal) = state.last_user_utterance().map(str::to_owned) else {
        error!("goal capture reached without a user utterance");
        state.error_message =
            Some("Internal error: goal capture reached without user input.".to_string());
        return state;
    };

    info!(goal = %goal, "goal captured");
    state.actionable_goal = Some(goal);
    state.push_agent(GOAL_CONFIRMATION);
    state.current_question = None;
    state.goal_setting_active = false;
    state
}

/// Why a gateway-calling stage could not produce its output.
enum StageFailure {
    Gateway(GatewayError),
    EmptyCompletion,
    MissingInput(&'static str),
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageFailure::Gateway(err) => write!(f, "{}", err),
            StageFailure::EmptyCompletion => write!(f, "model returned an empty response"),
            StageFailure::MissingInput(what) => write!(f, "{}", what),
        }
    }
}

/// Reduce a completion result to non-empty trimmed content.
fn require_content(
    result: Result<crate::ports::CompletionResponse, GatewayError>,
) -> Result<String, StageFailure> {
    match result {
        Ok(response) if response.is_empty() => Err(StageFailure::EmptyCompletion),
        Ok(response) => Ok(response.content.trim().to_string()),
        Err(err) => Err(StageFailure::Gateway(err)),
    }
}

/// Record a terminal stage failure on the state.
fn fail_stage(state: &mut DialogueState, doing: &str, failure: StageFailure) {
    error!(stage = doing, error = %failure, "stage failed terminally");
    state.error_message = Some(format!("Error while {}: {}", doing, failure));
    state.current_question = None;
}

/// Extract feedback from a failing quality-check verdict.
///
/// A leading NO token is stripped; the remainder is the reason.
fn parse_check_feedback(verdict: &str) -> String {
    let feedback = if verdict.to_uppercase().starts_with("NO") {
        verdict
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim())
            .unwrap_or("")
    } else {
        verdict
    };

    if feedback.is_empty() {
        "Summary deemed insufficient, but no specific feedback provided.".to_string()
    } else {
        feedback.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockGateway;
    use crate::ports::GatewayError;

    fn answered_state() -> DialogueState {
        let mut state = DialogueState::new(Some("the launch".to_string()));
        state.push_agent("How did the launch go?");
        state.push_user("Rough, we rolled back twice.");
        state
    }

    mod initiator {
        use super::*;

        #[test]
        fn opens_with_topic_question() {
            let state = initiate(DialogueState::new(Some("my week".to_string())));

            assert_eq!(state.history.len(), 1);
            let question = state.current_question.as_deref().unwrap();
            assert!(question.contains("'my week'"));
            assert_eq!(state.history[0].text, question);
        }

        #[test]
        fn opens_generic_without_topic() {
            let state = initiate(DialogueState::new(None));

            assert!(state
                .current_question
                .as_deref()
                .unwrap()
                .contains("What topic or experience"));
        }

        #[test]
        fn skips_when_history_exists() {
            let before = answered_state();
            let after = initiate(before.clone());
            assert_eq!(after, before);
        }
    }

    mod sentiment_tagger {
        use super::*;

        #[tokio::test]
        async fn tags_classified_sentiment() {
            let gateway = MockGateway::new().with_completion("negative");
            let state = classify_sentiment(answered_state(), &gateway).await;

            assert_eq!(state.last_sentiment, Some(Sentiment::Negative));
            assert!(state.error_message.is_none());
        }

        #[tokio::test]
        async fn gateway_failure_defaults_to_neutral() {
            let gateway = MockGateway::new().with_error(GatewayError::AuthenticationFailed);
            let state = classify_sentiment(answered_state(), &gateway).await;

            assert_eq!(state.last_sentiment, Some(Sentiment::Neutral));
            assert!(state.error_message.is_none());
        }

        #[tokio::test]
        async fn unrecognized_label_defaults_to_neutral() {
            let gateway = MockGateway::new().with_completion("somewhat upbeat");
            let state = classify_sentiment(answered_state(), &gateway).await;

            assert_eq!(state.last_sentiment, Some(Sentiment::Neutral));
        }

        #[tokio::test]
        async fn missing_user_utterance_defaults_to_neutral() {
            let gateway = MockGateway::new();
            let mut state = DialogueState::new(None);
            state.push_agent("Question?");

            let state = classify_sentiment(state, &gateway).await;

            assert_eq!(state.last_sentiment, Some(Sentiment::Neutral));
            assert_eq!(gateway.call_count(), 0);
        }
    }

    mod prober {
        use super::*;

        #[tokio::test]
        async fn appends_question_and_increments_counter() {
            let gateway = MockGateway::new().with_completion("What made the rollback hard?");
            let mut before = answered_state();
            before.last_sentiment = Some(Sentiment::Negative);

            let state = probe(before, &gateway).await;

            assert_eq!(state.probe_count, 1);
            assert_eq!(
                state.current_question.as_deref(),
                Some("What made the rollback hard?")
            );
            assert_eq!(state.history.len(), 3);
        }

        #[tokio::test]
        async fn frames_prompt_by_sentiment() {
            let gateway = MockGateway::new().with_completion("Q?");
            let mut before = answered_state();
            before.last_sentiment = Some(Sentiment::Negative);

            probe(before, &gateway).await;

            let requests = gateway.requests();
            assert!(requests[0].prompt.contains("negative sentiment"));
        }

        #[tokio::test]
        async fn gateway_failure_is_terminal() {
            let gateway = MockGateway::new().with_error(GatewayError::unavailable("down"));
            let state = probe(answered_state(), &gateway).await;

            assert!(state.error_message.is_some());
            assert!(state.current_question.is_none());
            // History gains no partial question.
            assert_eq!(state.history.len(), 2);
        }

        #[tokio::test]
        async fn empty_completion_is_terminal() {
            let gateway = MockGateway::new().with_completion("   ");
            let state = probe(answered_state(), &gateway).await;

            assert!(state.error_message.is_some());
        }
    }

    mod summarizer {
        use super::*;

        #[tokio::test]
        async fn stores_summary_without_touching_history() {
            let gateway = MockGateway::new().with_completion("A rough launch, twice rolled back.");
            let before = answered_state();
            let history_len = before.history.len();

            let state = summarize(before, &gateway).await;

            assert_eq!(
                state.summary.as_deref(),
                Some("A rough launch, twice rolled back.")
            );
            assert_eq!(state.history.len(), history_len);
        }

        #[tokio::test]
        async fn consumes_correction_feedback_once() {
            let gateway = MockGateway::new().with_completion("Revised summary.");
            let mut before = answered_state();
            before.correction_feedback = Some("missing challenge discussion".to_string());

            let state = summarize(before, &gateway).await;

            assert!(state.correction_feedback.is_none());
            let requests = gateway.requests();
            assert!(requests[0]
                .prompt
                .contains("PREVIOUS ATTEMPT FEEDBACK: missing challenge discussion"));
        }

        #[tokio::test]
        async fn gateway_failure_is_terminal() {
            let gateway = MockGateway::new().with_error(GatewayError::Timeout { timeout_secs: 15 });
            let state = summarize(answered_state(), &gateway).await;

            assert!(state.error_message.is_some());
            assert!(state.summary.is_none());
        }
    }

    mod corrector {
        use super::*;

        fn state_with_summary() -> DialogueState {
            let mut state = answered_state();
            state.summary = Some("A rough launch.".to_string());
            state
        }

        #[tokio::test]
        async fn leading_yes_passes() {
            let gateway = MockGateway::new().with_completion("YES");
            let state = check_summary(state_with_summary(), &gateway).await;

            assert!(!state.needs_correction);
            assert!(state.correction_feedback.is_none());
            assert!(state.error_message.is_none());
        }

        #[tokio::test]
        async fn yes_with_trailing_text_still_passes() {
            let gateway = MockGateway::new().with_completion("Yes, this covers everything.");
            let state = check_summary(state_with_summary(), &gateway).await;

            assert!(!state.needs_correction);
        }

        #[tokio::test]
        async fn leading_no_fails_with_feedback() {
            let gateway =
                MockGateway::new().with_completion("NO, missing the challenge discussion");
            let state = check_summary(state_with_summary(), &gateway).await;

            assert!(state.needs_correction);
            assert_eq!(
                state.correction_feedback.as_deref(),
                Some("missing the challenge discussion")
            );
        }

        #[tokio::test]
        async fn bare_no_fails_with_canned_feedback() {
            let gateway = MockGateway::new().with_completion("NO");
            let state = check_summary(state_with_summary(), &gateway).await;

            assert!(state.needs_correction);
            assert!(state
                .correction_feedback
                .as_deref()
                .unwrap()
                .contains("no specific feedback"));
        }

        #[tokio::test]
        async fn ambiguous_verdict_fails_closed() {
            let gateway = MockGateway::new().with_completion("It depends on the reader.");
            let state = check_summary(state_with_summary(), &gateway).await;

            assert!(state.needs_correction);
            assert_eq!(
                state.correction_feedback.as_deref(),
                Some("It depends on the reader.")
            );
        }

        #[tokio::test]
        async fn gateway_failure_is_terminal() {
            let gateway = MockGateway::new().with_error(GatewayError::unavailable("down"));
            let state = check_summary(state_with_summary(), &gateway).await;

            assert!(state.error_message.is_some());
        }

        #[tokio::test]
        async fn missing_summary_is_terminal() {
            let gateway = MockGateway::new();
            let state = check_summary(answered_state(), &gateway).await;

            assert!(state.error_message.is_some());
            assert_eq!(gateway.call_count(), 0);
        }
    }

    mod goal_suggester {
        use super::*;

        #[tokio::test]
        async fn presents_summary_and_question() {
            let gateway =
                MockGateway::new().with_completion("What one step will you take next week?");
            let mut before = answered_state();
            before.summary = Some("A rough launch.".to_string());

            let state = suggest_goal(before, &gateway).await;

            let question = state.current_question.as_deref().unwrap();
            assert!(question.contains("A rough launch."));
            assert!(question.contains("What one step will you take next week?"));
            assert!(state.goal_setting_active);
            assert_eq!(state.history.last().unwrap().text, question);
        }

        #[tokio::test]
        async fn gateway_failure_is_terminal() {
            let gateway = MockGateway::new().with_error(GatewayError::unavailable("down"));
            let mut before = answered_state();
            before.summary = Some("A rough launch.".to_string());

            let state = suggest_goal(before, &gateway).await;

            assert!(state.error_message.is_some());
            assert!(!state.goal_setting_active);
        }
    }

    mod goal_capturer {
        use super::*;

        #[test]
        fn stores_goal_verbatim_and_confirms() {
            let mut before = answered_state();
            before.goal_setting_active = true;
            before.push_user("Document the runbook");

            let state = capture_goal(before);

            assert_eq!(state.actionable_goal.as_deref(), Some("Document the runbook"));
            assert_eq!(state.history.last().unwrap().text, GOAL_CONFIRMATION);
            assert!(!state.goal_setting_active);
            assert!(state.current_question.is_none());
            assert!(state.is_terminal());
        }

        #[test]
        fn missing_user_input_is_terminal() {
            let mut before = DialogueState::new(None);
            before.push_agent("What will you do next?");
            before.goal_setting_active = true;

            let state = capture_goal(before);

            assert!(state.error_message.is_some());
            assert!(state.actionable_goal.is_none());
        }
    }
}
