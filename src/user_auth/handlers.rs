use axum::{Json, extract::State, extract::rejection::JsonRejection};
use std::sync::Arc;

use super::service::{LoginError, LoginRequest, LoginResponse};
use crate::error::{ApiError, ErrorBody};
use crate::gateway::state::AppState;

/// Login user
///
/// POST /api/v1/login
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Body could not be decoded", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        tracing::warn!("could not decode login request: {}", e);
        ApiError::from(e)
    })?;
    let username = req.username.clone();

    match state.user_auth.login(req).await {
        Ok(resp) => Ok(Json(resp)),
        Err(e) if e.is_credential_failure() => {
            tracing::warn!(%username, "login failed: {}", e);
            Err(ApiError::unauthorized())
        }
        Err(LoginError::Signing(e)) => {
            tracing::error!("token signing failed, key material unusable: {}", e);
            Err(ApiError::upstream("token signing failed"))
        }
        Err(e) => Err(ApiError::upstream(e)),
    }
}
