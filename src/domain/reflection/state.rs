//! Dialogue State Entity
//!
//! The single record threaded through every step of a reflection session.
//! The server holds no copy between turns: the full state serializes out to
//! the caller with each response and back in with the next request.

use serde::{Deserialize, Serialize};

/// Complete state of a reflection session.
///
/// Stage functions treat this as an immutable-per-step value: each stage
/// consumes a state and returns an updated one rather than mutating shared
/// data, which keeps the history-monotonicity invariant easy to reason about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DialogueState {
    /// Subject of the reflection; set at session start, immutable thereafter.
    pub topic: Option<String>,
    /// Ordered conversation history, append-only.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// The most recent question posed to the user; present whenever the
    /// driver is waiting on user input.
    pub current_question: Option<String>,
    /// Latest generated summary; overwritten on each summarization attempt.
    pub summary: Option<String>,
    /// True when the most recent summary failed its quality check.
    #[serde(default)]
    pub needs_correction: bool,
    /// Correction retries performed so far.
    #[serde(default)]
    pub correction_attempts: u32,
    /// Deficiency noted by the quality check; consumed by the next
    /// summarization attempt.
    pub correction_feedback: Option<String>,
    /// Probing rounds performed so far.
    #[serde(default)]
    pub probe_count: u32,
    /// Sentiment of the most recent user utterance.
    pub last_sentiment: Option<Sentiment>,
    /// The user-defined action captured after summary approval.
    pub actionable_goal: Option<String>,
    /// True while the driver is waiting for the user's goal statement.
    #[serde(default)]
    pub goal_setting_active: bool,
    /// Set when a stage hits an unrecoverable failure; once set, the
    /// session is terminal.
    pub error_message: Option<String>,
}

impl DialogueState {
    /// Create a fresh state for a new session.
    pub fn new(topic: Option<String>) -> Self {
        Self {
            topic,
            history: Vec::new(),
            current_question: None,
            summary: None,
            needs_correction: false,
            correction_attempts: 0,
            correction_feedback: None,
            probe_count: 0,
            last_sentiment: None,
            actionable_goal: None,
            goal_setting_active: false,
            error_message: None,
        }
    }

    /// Append an agent utterance to the history.
    pub fn push_agent(&mut self, text: impl Into<String>) {
        self.history.push(HistoryEntry::agent(text));
    }

    /// Append a user utterance to the history.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.history.push(HistoryEntry::user(text));
    }

    /// The most recent user utterance, if the last history entry is one.
    pub fn last_user_utterance(&self) -> Option<&str> {
        match self.history.last() {
            Some(entry) if entry.speaker == Speaker::User => Some(&entry.text),
            _ => None,
        }
    }

    /// True once the session has concluded, successfully or not.
    pub fn is_terminal(&self) -> bool {
        self.error_message.is_some() || self.actionable_goal.is_some()
    }

    /// Derive the conversational phase from the state fields.
    ///
    /// There is no stored phase enum on the wire; the fields unambiguously
    /// determine where the session stands at every pause point.
    pub fn phase(&self) -> DialoguePhase {
        if self.error_message.is_some() {
            DialoguePhase::Failed
        } else if self.actionable_goal.is_some() {
            DialoguePhase::Done
        } else if self.goal_setting_active {
            DialoguePhase::AwaitingGoal
        } else if self.current_question.is_some() {
            DialoguePhase::AwaitingProbeAnswer
        } else {
            DialoguePhase::AwaitingTopic
        }
    }
}

/// A single (speaker, utterance) pair in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl HistoryEntry {
    /// Creates an agent entry.
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Agent,
            text: text.into(),
        }
    }

    /// Creates a user entry.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }
}

/// Who produced an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

/// Sentiment classification of a user utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    /// Parse a model reply into a sentiment label.
    ///
    /// Anything other than the three known labels resolves to `Neutral`,
    /// the conservative default.
    pub fn parse_or_neutral(reply: &str) -> Self {
        match reply.trim().to_lowercase().as_str() {
            "positive" => Self::Positive,
            "negative" => Self::Negative,
            "neutral" => Self::Neutral,
            _ => Self::Neutral,
        }
    }
}

/// Conversational phase derived from state fields at a pause point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialoguePhase {
    /// Fresh session, nothing asked yet.
    AwaitingTopic,
    /// A probe (or opening) question is pending a user answer.
    AwaitingProbeAnswer,
    /// The goal question is pending a user answer.
    AwaitingGoal,
    /// Goal captured, session complete.
    Done,
    /// Unrecoverable failure, session concluded.
    Failed,
}

/// Bounds on the probing and correction loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Maximum probing rounds before summarization is forced.
    pub max_probes: u32,
    /// Maximum correction retries for the summary.
    pub max_correction_attempts: u32,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_probes: 4,
            max_correction_attempts: 2,
        }
    }
}
