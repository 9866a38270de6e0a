//! Data models for users and todo records

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Stored user record. This is the identity the auth core reads at login.
///
/// `password_hash` is an argon2 PHC string and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[schema(example = "u-1")]
    pub id: String,
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(example = "alice")]
    pub username: String,
    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub password_hash: String,
    /// Granted permission scopes, in grant order.
    #[serde(default)]
    pub scope: Vec<String>,
}

/// Todo record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Todo {
    pub id: String,
    #[schema(example = "Buy milk")]
    pub title: String,
    #[schema(example = "open")]
    pub status: String,
    /// Owning user id
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// User creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Generated when absent
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 128))]
    #[schema(example = "Alice")]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(length(min = 1, max = 256))]
    #[schema(example = "secret")]
    pub password: String,
    #[serde(default)]
    pub scope: Vec<String>,
}

/// User replacement request. The stored hash is kept when `password` is absent.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 256))]
    pub password: Option<String>,
    #[serde(default)]
    pub scope: Vec<String>,
}

/// Todo create / replace request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TodoRequest {
    /// Generated when absent (create only)
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 512))]
    pub title: String,
    #[validate(length(min = 1, max = 32))]
    pub status: String,
    /// Defaults to the caller on create
    #[serde(default)]
    pub owner_id: Option<String>,
}
