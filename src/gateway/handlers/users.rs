//! User record handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use super::super::state::AppState;
use crate::account::{CreateUserRequest, UpdateUserRequest, User};
use crate::error::{ApiError, ErrorBody};
use crate::user_auth::hash_password;

async fn hash_off_runtime(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(ApiError::upstream)?
        .map_err(ApiError::upstream)
}

/// List users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn get_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    state
        .users
        .find_by_id(&user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("user {}", user_id)))
}

/// Register a new user
///
/// The password is hashed before it reaches the store.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "Username or id already exists", body = ErrorBody)
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let user = User {
        id: req
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        name: req.name,
        username: req.username,
        password_hash: hash_off_runtime(req.password).await?,
        scope: req.scope,
    };
    state.users.insert(user.clone()).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Replace a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let existing = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user {}", user_id)))?;

    let password_hash = match req.password {
        Some(password) => hash_off_runtime(password).await?,
        None => existing.password_hash,
    };
    let user = User {
        id: user_id,
        name: req.name,
        username: req.username,
        password_hash,
        scope: req.scope,
    };

    if !state.users.replace(user.clone()).await? {
        return Err(ApiError::not_found(format!("user {}", user.id)));
    }
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.users.delete(&user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("user {}", user_id)))
    }
}
