//! Route definitions for reflection endpoints

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{health, process_turn, ReflectionAppState};

/// Create reflection router with all endpoints
///
/// # Endpoints
///
/// - `POST /reflection/turns` - Advance a session by one turn
/// - `GET /health` - Liveness probe
pub fn routes() -> Router<ReflectionAppState> {
    Router::new()
        .route("/reflection/turns", post(process_turn))
        .route("/health", get(health))
}
