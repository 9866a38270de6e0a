//! todose - todo records behind RS256 bearer-token authentication
//!
//! # Modules
//!
//! - [`user_auth`] - Password login, token issuance/validation, request guard
//! - [`account`] - User and todo stores (PostgreSQL, in-memory)
//! - [`gateway`] - Axum router, handlers, OpenAPI
//! - [`error`] - HTTP error taxonomy
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup

pub mod account;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod user_auth;

pub use error::{ApiError, ErrorCode};
pub use gateway::{build_router, run_server, state::AppState};
pub use user_auth::{AuthGuard, Claims, KeyMaterial, TokenIssuer, TokenValidator};
