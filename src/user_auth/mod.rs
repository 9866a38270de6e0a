//! User authentication: password login and RS256 bearer tokens.
//!
//! ## Components
//! - `keys`: RSA key material, loaded once at startup
//! - `password`: argon2 hashing and verification
//! - `token`: token issuance and validation
//! - `middleware`: bearer-token guard for protected routes
//! - `service`: login flow (store lookup, password check, issuance)
//! - `handlers`: `POST /api/v1/login`

pub mod handlers;
pub mod keys;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

pub use keys::{KeyError, KeyMaterial, SIGNING_ALGORITHM};
pub use middleware::{AuthGuard, GuardError, extract_bearer, jwt_auth_middleware};
pub use password::{PasswordError, hash_password, verify_password};
pub use service::{LoginError, LoginRequest, LoginResponse, UserAuthService, prime_dummy_hash};
pub use token::{Claims, ISSUER, SigningError, TOKEN_TTL_SECS, TokenError, TokenIssuer, TokenValidator};
