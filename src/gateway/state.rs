use std::sync::Arc;

use crate::account::{TodoStore, UserStore};
use crate::user_auth::UserAuthService;

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    /// Login flow (credential lookup, password check, token issuance)
    pub user_auth: Arc<UserAuthService>,
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
}

impl AppState {
    pub fn new(
        user_auth: Arc<UserAuthService>,
        users: Arc<dyn UserStore>,
        todos: Arc<dyn TodoStore>,
    ) -> Self {
        Self {
            user_auth,
            users,
            todos,
        }
    }
}
