//! Bearer token issuance and validation (compact JWS, RS256).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, Header, Validation, decode, decode_header, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::keys::{KeyMaterial, SIGNING_ALGORITHM};
use crate::account::User;

/// `iss` claim of every token this service signs.
pub const ISSUER: &str = "todose";

/// Lifetime of an issued token: `exp == iat + TOKEN_TTL_SECS`.
pub const TOKEN_TTL_SECS: i64 = 15 * 60;

/// JWT Claims structure
///
/// A snapshot of the user at issuance time; scope changes made afterwards are
/// not reflected until a new token is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub username: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub scope: Vec<String>,
    pub iss: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration time (seconds since epoch)
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User, issued_at: DateTime<Utc>) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            scope: user.scope.clone(),
            iss: ISSUER.to_string(),
            iat,
            exp: iat + TOKEN_TTL_SECS,
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.iter().any(|s| s == scope)
    }
}

/// Signing failures mean the key material is unusable, not that the request was bad.
#[derive(Debug, Error)]
#[error("token signing failed: {0}")]
pub struct SigningError(#[from] jsonwebtoken::errors::Error);

/// Why a token was refused. Callers treat every variant the same way; the
/// variant only feeds the logs.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("missing Authorization header")]
    MissingHeader,

    #[error("Authorization header is not a bearer credential")]
    NotBearer,

    #[error("token is not a compact JWS")]
    Malformed,

    #[error("disallowed signing algorithm {0:?}")]
    DisallowedAlgorithm(Algorithm),

    #[error("token expired")]
    Expired,

    #[error("token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),
}

/// Signs claims with the private half of [`KeyMaterial`]. Holds no per-call state.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<KeyMaterial>,
}

impl TokenIssuer {
    pub fn new(keys: Arc<KeyMaterial>) -> Self {
        Self { keys }
    }

    pub fn issue(&self, user: &User) -> Result<String, SigningError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, SigningError> {
        self.sign(&Claims::for_user(user, now))
    }

    fn sign(&self, claims: &Claims) -> Result<String, SigningError> {
        let token = encode(
            &Header::new(SIGNING_ALGORITHM),
            claims,
            self.keys.encoding_key(),
        )?;
        Ok(token)
    }
}

/// Verifies tokens against the public half of [`KeyMaterial`].
#[derive(Debug, Clone)]
pub struct TokenValidator {
    keys: Arc<KeyMaterial>,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(keys: Arc<KeyMaterial>) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
        Self { keys, validation }
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate as of `now` (seconds since epoch).
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        if token.is_empty()
            || token.split('.').count() != 3
            || token.chars().any(char::is_whitespace)
        {
            return Err(TokenError::Malformed);
        }

        // The algorithm is pinned here, never taken from the token.
        let header = decode_header(token)?;
        if header.alg != SIGNING_ALGORITHM {
            return Err(TokenError::DisallowedAlgorithm(header.alg));
        }

        let data = decode::<Claims>(token, self.keys.decoding_key(), &self.validation)?;
        if data.claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}
