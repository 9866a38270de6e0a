//! Health check handler

use std::sync::Arc;

use axum::{extract::State, http::StatusCode};

use super::super::state::AppState;

/// Health check endpoint
///
/// Pings the user store. The failure detail is logged, never returned.
///
/// - Healthy: 200 OK + `OK`
/// - Unhealthy: 503 Service Unavailable + `unavailable`
#[utoipa::path(
    get,
    path = "/api/v1/healthz",
    responses(
        (status = 200, description = "Service healthy", body = String, content_type = "text/plain"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.users.ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!("[HEALTH] store ping failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}
