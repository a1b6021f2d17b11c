//! Prompt builders for the reflection stages.
//!
//! Pure string construction; no gateway knowledge. Each builder produces the
//! full prompt a stage submits to the gateway.

use super::state::{HistoryEntry, Sentiment, Speaker};

/// How many trailing history entries the probe prompt includes.
const PROBE_HISTORY_TAIL: usize = 6;

/// System prompt shared by all generation requests.
pub const SYSTEM_PROMPT: &str = "You are a thoughtful reflection coach. You help people examine \
their experiences through short, open-ended questions and concise summaries. Never lecture; \
keep every reply brief and conversational.";

/// The opening question for a new session.
///
/// Templated rather than generated: the opener must work even when the
/// gateway is unreachable.
pub fn initiation_question(topic: Option<&str>) -> String {
    match topic {
        Some(topic) => format!(
            "Okay, let's reflect on '{}'. To start, could you tell me briefly what happened \
             regarding this?",
            topic
        ),
        None => "Hello! What topic or experience would you like to reflect on today?".to_string(),
    }
}

/// Prompt to classify the sentiment of a user message.
pub fn sentiment_prompt(user_message: &str) -> String {
    format!(
        "Classify the sentiment of the following user message. Respond with only one word: \
         'positive', 'negative', or 'neutral'.\n\nUser Message: \"{}\"\n\nSentiment:",
        user_message
    )
}

/// Prompt for one sentiment-framed follow-up question.
///
/// Only the tail of the history is included; probing is about the user's
/// latest statement, not the whole transcript.
pub fn probe_prompt(history: &[HistoryEntry], sentiment: Sentiment) -> String {
    let tail_start = history.len().saturating_sub(PROBE_HISTORY_TAIL);
    let formatted = format_history(&history[tail_start..]);

    let framing = match sentiment {
        Sentiment::Negative => {
            "The user's last message carried a negative sentiment. Focus the question on the \
             challenge: what made it difficult, and what they might take from it. Be supportive, \
             not probing for blame."
        }
        Sentiment::Positive => {
            "The user's last message carried a positive sentiment. Focus the question on the \
             success: what worked, and how they could build on it."
        }
        Sentiment::Neutral => {
            "Keep the question balanced: explore feelings, challenges, learnings, or specifics."
        }
    };

    format!(
        "Based on the following conversation history:\n{}\n\nAsk the user *one* relevant, \
         open-ended follow-up question to encourage deeper reflection on their last statement. \
         {} Avoid simple yes/no questions. Respond with the question only.",
        formatted, framing
    )
}

/// Prompt asking whether the reflection is deep enough to summarize.
pub fn depth_prompt(history: &[HistoryEntry]) -> String {
    format!(
        "Review the following conversation history between an agent and a user reflecting on a \
         topic:\n\n{}\n\nBased *only* on this history, has the user explored their experience, \
         challenges, feelings, or learnings in sufficient detail to allow for a meaningful \
         summary? Answer only with YES or NO.",
        format_history(history)
    )
}

/// Prompt to summarize the conversation, optionally addressing feedback from
/// a failed quality check.
pub fn summarize_prompt(history: &[HistoryEntry], correction_feedback: Option<&str>) -> String {
    let base = format!(
        "Based on the following conversation history between an agent and a user:\n\n{}\n\n\
         Please provide a concise summary of the key points discussed, focusing on the user's \
         reflections, challenges mentioned, and any potential learnings or insights revealed. \
         Structure it as a short paragraph or a few bullet points.",
        format_history(history)
    );

    match correction_feedback {
        Some(feedback) => format!(
            "{}\n\nPREVIOUS ATTEMPT FEEDBACK: {}\nPlease generate a *revised* summary \
             addressing this feedback.",
            base, feedback
        ),
        None => base,
    }
}

/// Prompt to judge a generated summary against the history.
pub fn check_summary_prompt(history: &[HistoryEntry], summary: &str) -> String {
    format!(
        "Review the following conversation history:\n\n{}\n\nNow review this generated \
         summary:\n\nSUMMARY:\n{}\n\nCritique this summary based on the history. Is it accurate, \
         relevant, and does it capture the key points, feelings, and challenges discussed?\n\
         If the summary is good and requires no changes, respond with only YES.\n\
         If the summary is lacking or inaccurate, respond with NO, followed by a brief \
         explanation of what specific information is missing or needs correction based *only* \
         on the conversation history.",
        format_history(history),
        summary
    )
}

/// Prompt for one actionable-step question based on the approved summary.
pub fn goal_prompt(summary: &str) -> String {
    format!(
        "The user has just finished a reflection session. This is the agreed summary of it:\n\n\
         {}\n\nAsk the user *one* short question inviting them to name a single concrete, \
         actionable next step they want to commit to based on this reflection. Respond with the \
         question only.",
        summary
    )
}

/// Render history as `speaker: text` lines.
fn format_history(history: &[HistoryEntry]) -> String {
    history
        .iter()
        .map(|entry| {
            let speaker = match entry.speaker {
                Speaker::User => "user",
                Speaker::Agent => "agent",
            };
            format!("{}: {}", speaker, entry.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
