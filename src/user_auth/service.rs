use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;

use super::password::{PasswordError, verify_password};
use super::token::{SigningError, TokenIssuer};
use crate::account::{StoreError, UserStore};

// Verified against when the username is unknown, so both paths cost one hash.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    match super::password::hash_password("todose-unknown-user") {
        Ok(hash) => Some(hash),
        Err(e) => {
            tracing::warn!("dummy password hash unavailable: {}", e);
            None
        }
    }
});

/// Compute the unknown-user hash ahead of the first login. Runs argon2, so
/// call it off the async workers. Returns `false` when the hash is missing and
/// unknown usernames are answered without a verification.
pub fn prime_dummy_hash() -> bool {
    DUMMY_HASH.is_some()
}

/// User Login Request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "secret")]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login Response (signed bearer token)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("unknown user")]
    UnknownUser,

    #[error("password mismatch")]
    PasswordMismatch,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("credential store failure: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("password verification task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl LoginError {
    /// Failures attributable to the submitted credentials (reported as 401).
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            Self::UnknownUser | Self::PasswordMismatch | Self::Password(_)
        )
    }
}

pub struct UserAuthService {
    users: Arc<dyn UserStore>,
    issuer: TokenIssuer,
}

impl UserAuthService {
    pub fn new(users: Arc<dyn UserStore>, issuer: TokenIssuer) -> Self {
        Self { users, issuer }
    }

    /// Login user and issue JWT
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, LoginError> {
        // 1. Find user by username
        let user = self.users.find_by_username(&req.username).await?;
        let Some(user) = user else {
            if let Some(dummy) = DUMMY_HASH.as_ref() {
                let _ = check_password(req.password, dummy.clone()).await;
            }
            return Err(LoginError::UnknownUser);
        };

        // 2. Verify password
        if !check_password(req.password, user.password_hash.clone()).await? {
            return Err(LoginError::PasswordMismatch);
        }

        // 3. Issue token
        let token = self.issuer.issue(&user)?;
        tracing::info!(user_id = %user.id, username = %user.username, "login succeeded");
        Ok(LoginResponse { token })
    }
}

// argon2 is deliberately slow; keep it off the async workers.
async fn check_password(plaintext: String, stored_hash: String) -> Result<bool, LoginError> {
    let matched =
        tokio::task::spawn_blocking(move || verify_password(&plaintext, &stored_hash)).await??;
    Ok(matched)
}
