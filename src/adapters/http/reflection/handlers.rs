//! HTTP handlers for reflection endpoints
//!
//! These handlers connect Axum routes to the application layer.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::reflection::{
    ProcessTurnCommand, ProcessTurnError, ProcessTurnHandler,
};
use crate::domain::reflection::{DialogueState, SessionLimits};
use crate::ports::AiGateway;

use super::dto::{ErrorResponse, HealthResponse, TurnRequest, TurnResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct ReflectionAppState {
    pub gateway: Arc<dyn AiGateway>,
    pub limits: SessionLimits,
}

impl ReflectionAppState {
    pub fn new(gateway: Arc<dyn AiGateway>, limits: SessionLimits) -> Self {
        Self { gateway, limits }
    }

    pub fn process_turn_handler(&self) -> ProcessTurnHandler {
        ProcessTurnHandler::new(self.gateway.clone(), self.limits)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// Advance a reflective session by one turn
///
/// POST /reflection/turns
pub async fn process_turn(
    State(app_state): State<ReflectionAppState>,
    Json(req): Json<TurnRequest>,
) -> Result<impl IntoResponse, impl IntoResponse> {
    // Parse the caller-held state document
    let current_state: Option<DialogueState> = match req.current_state {
        None => None,
        Some(value) => Some(serde_json::from_value(value).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(format!(
                    "Invalid current_state: {}",
                    e
                ))),
            )
        })?),
    };

    // Create command
    let cmd = ProcessTurnCommand {
        topic: req.topic,
        user_input: req.user_input,
        current_state,
    };

    // Execute command
    let handler = app_state.process_turn_handler();
    let result = handler.handle(cmd).await.map_err(|e| match e {
        ProcessTurnError::MissingUserInput
        | ProcessTurnError::SessionConcluded
        | ProcessTurnError::NoPendingQuestion => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(e.to_string())),
        ),
    })?;

    // Build response
    let response = TurnResponse {
        agent_response: result.agent_response,
        next_state: result.next_state,
        is_final_turn: result.is_final_turn,
    };

    Ok::<_, (StatusCode, Json<ErrorResponse>)>((StatusCode::OK, Json(response)))
}

/// Liveness probe with gateway identification
///
/// GET /health
pub async fn health(State(app_state): State<ReflectionAppState>) -> impl IntoResponse {
    let info = app_state.gateway.gateway_info();

    let response = HealthResponse {
        status: "ok".to_string(),
        gateway: info.name,
        model: info.model,
    };

    (StatusCode::OK, Json(response))
}
