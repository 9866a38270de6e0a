use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use thiserror::Error;

use super::token::{Claims, TokenError, TokenValidator};
use crate::error::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Error)]
pub enum GuardError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("token lacks required scope {0}")]
    MissingScope(String),
}

impl From<GuardError> for ApiError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Token(_) => ApiError::unauthorized(),
            GuardError::MissingScope(_) => ApiError::forbidden(),
        }
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// Runs before any cryptographic work; a missing or non-bearer header never
/// reaches the validator.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, TokenError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(TokenError::MissingHeader)?
        .to_str()
        .map_err(|_| TokenError::NotBearer)?;

    value
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
        .ok_or(TokenError::NotBearer)
}

/// Request gate for protected routes.
///
/// Without a required scope every valid, unexpired token is admitted.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    validator: Arc<TokenValidator>,
    required_scope: Option<String>,
}

impl AuthGuard {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self {
            validator,
            required_scope: None,
        }
    }

    /// Additionally require `scope` in the token's claims.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.required_scope = Some(scope.into());
        self
    }

    pub fn authorize(&self, headers: &HeaderMap) -> Result<Claims, GuardError> {
        let token = extract_bearer(headers)?;
        let claims = self.validator.validate(token)?;

        if let Some(scope) = &self.required_scope {
            if !claims.has_scope(scope) {
                return Err(GuardError::MissingScope(scope.clone()));
            }
        }
        Ok(claims)
    }
}

/// Axum middleware: on success the decoded [`Claims`] are available to the
/// handler through `Extension<Claims>`.
pub async fn jwt_auth_middleware(
    State(guard): State<AuthGuard>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    match guard.authorize(request.headers()) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                "request rejected: {}",
                e
            );
            Err(e.into())
        }
    }
}
