//! Todo record handlers. All routes sit behind the bearer-token guard.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use super::super::state::AppState;
use crate::account::{Todo, TodoRequest};
use crate::error::{ApiError, ErrorBody};
use crate::user_auth::Claims;

/// List todos
#[utoipa::path(
    get,
    path = "/api/v1/todos",
    responses(
        (status = 200, description = "All todos", body = Vec<Todo>),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    security(("bearer_jwt" = [])),
    tag = "Todos"
)]
pub async fn get_todos(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(state.todos.list().await?))
}

/// Get a todo by id
#[utoipa::path(
    get,
    path = "/api/v1/todos/{todo_id}",
    params(("todo_id" = String, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Todo", body = Todo),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    ),
    security(("bearer_jwt" = [])),
    tag = "Todos"
)]
pub async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    state
        .todos
        .find_by_id(&todo_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("todo {}", todo_id)))
}

/// Create a todo
///
/// Without an explicit `owner_id` the todo belongs to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/todos",
    request_body = TodoRequest,
    responses(
        (status = 201, description = "Todo created", body = Todo),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 409, description = "Id already exists", body = ErrorBody)
    ),
    security(("bearer_jwt" = [])),
    tag = "Todos"
)]
pub async fn create_todo(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let todo = Todo {
        id: req
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        title: req.title,
        status: req.status,
        owner_id: req.owner_id.or(Some(claims.sub)),
    };
    state.todos.insert(todo.clone()).await?;

    tracing::debug!(todo_id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Replace a todo
#[utoipa::path(
    put,
    path = "/api/v1/todos/{todo_id}",
    params(("todo_id" = String, Path, description = "Todo id")),
    request_body = TodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = Todo),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    ),
    security(("bearer_jwt" = [])),
    tag = "Todos"
)]
pub async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<String>,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    // The path id wins over any id in the body
    let todo = Todo {
        id: todo_id,
        title: req.title,
        status: req.status,
        owner_id: req.owner_id,
    };
    if !state.todos.replace(todo.clone()).await? {
        return Err(ApiError::not_found(format!("todo {}", todo.id)));
    }
    Ok(Json(todo))
}

/// Delete a todo
#[utoipa::path(
    delete,
    path = "/api/v1/todos/{todo_id}",
    params(("todo_id" = String, Path, description = "Todo id")),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    ),
    security(("bearer_jwt" = [])),
    tag = "Todos"
)]
pub async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.todos.delete(&todo_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("todo {}", todo_id)))
    }
}
