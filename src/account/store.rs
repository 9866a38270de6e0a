//! Storage seams for users and todos.
//!
//! The auth core only needs [`UserStore::find_by_username`]; the rest of the
//! surface backs the record handlers.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Todo, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("duplicate record: {0}")]
    Conflict(String),
}

/// Credential store and user records
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn insert(&self, user: User) -> Result<(), StoreError>;

    /// Returns `false` when no user with `user.id` exists.
    async fn replace(&self, user: User) -> Result<bool, StoreError>;

    /// Returns `false` when no user with `id` exists.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Backend liveness check
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Todo>, StoreError>;

    async fn insert(&self, todo: Todo) -> Result<(), StoreError>;

    async fn replace(&self, todo: Todo) -> Result<bool, StoreError>;

    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}
