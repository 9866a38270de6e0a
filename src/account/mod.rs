//! User and todo storage
//!
//! - [`store`]: `UserStore` / `TodoStore` traits
//! - [`repository`]: PostgreSQL implementation
//! - [`memory`]: in-process implementation

pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use memory::MemoryStore;
pub use models::{CreateUserRequest, Todo, TodoRequest, UpdateUserRequest, User};
pub use repository::PgStore;
pub use store::{StoreError, TodoStore, UserStore};
