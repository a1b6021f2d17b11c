//! HTTP DTOs for reflection endpoints
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::reflection::DialogueState;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to advance a reflective session by one turn.
///
/// `current_state` is kept as raw JSON so a malformed state document can be
/// rejected with a 400 instead of a generic body-extraction failure.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub user_input: Option<String>,
    #[serde(default)]
    pub current_state: Option<serde_json::Value>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for a processed turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub agent_response: String,
    pub next_state: DialogueState,
    pub is_final_turn: bool,
}

/// Response for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub gateway: String,
    pub model: String,
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }
}
