//! HTTP handlers
//!
//! - [`health`]: liveness of the backing store
//! - [`users`]: user records (registration is public, the rest is guarded)
//! - [`todos`]: todo records (guarded)

pub mod health;
pub mod todos;
pub mod users;

pub use health::health_check;
pub use todos::{create_todo, delete_todo, get_todo, get_todos, update_todo};
pub use users::{create_user, delete_user, get_user, get_users, update_user};
