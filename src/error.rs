//! HTTP-facing error types.
//!
//! Every failure is converted into an [`ApiError`] at the point it is detected.
//! Authentication failures share one code and one message so callers cannot
//! tell which part of the credential check failed.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::account::StoreError;

/// API error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    /// 1001: Body could not be decoded or failed validation
    RequestMalformed = 1001,
    /// 2001: Missing, invalid or expired credentials
    AuthenticationFailed = 2001,
    /// 2003: Valid token without the scope the route requires
    PermissionDenied = 2003,
    /// 4004: Record not found
    NotFound = 4004,
    /// 4009: Record already exists
    Conflict = 4009,
    /// 5000: Backing store or other upstream failure
    Upstream = 5000,
    /// 5003: Dependency health check failed
    Unavailable = 5003,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::RequestMalformed => "REQUEST_MALFORMED",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Upstream => "UPSTREAM_FAILURE",
            Self::Unavailable => "UNAVAILABLE",
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            Self::RequestMalformed => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{}: {message}", .code.name())]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RequestMalformed, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::AuthenticationFailed, "authentication failed")
    }

    pub fn forbidden() -> Self {
        Self::new(ErrorCode::PermissionDenied, "insufficient scope")
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, format!("{} not found", what.into()))
    }

    /// The detail is logged, the response carries a generic message.
    pub fn upstream(detail: impl std::fmt::Display) -> Self {
        tracing::error!("upstream failure: {}", detail);
        Self::new(ErrorCode::Upstream, "internal server error")
    }
}

/// JSON error body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = 2001)]
    pub code: i32,
    #[schema(example = "AUTHENTICATION_FAILED")]
    pub error: &'static str,
    #[schema(example = "authentication failed")]
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code.code(),
            error: self.code.name(),
            message: self.message,
        };
        (self.code.http_status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::malformed(format!("could not decode request body: {}", rejection.body_text()))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::malformed(format!("invalid request: {}", errors))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(what) => {
                Self::new(ErrorCode::Conflict, format!("{} already exists", what))
            }
            other => Self::upstream(other),
        }
    }
}
