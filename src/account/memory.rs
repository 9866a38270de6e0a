//! In-process store, used when no PostgreSQL URL is configured

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::models::{Todo, User};
use super::store::{StoreError, TodoStore, UserStore};

/// Lock order: a `users` guard may be held while touching `usernames`, never
/// the reverse.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    /// username -> user id; a username is owned once its entry exists here
    usernames: DashMap<String, String>,
    todos: DashMap<String, Todo>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn reserve_username(&self, username: &str, id: &str) -> Result<(), StoreError> {
        match self.usernames.entry(username.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!("username {}", username))),
            Entry::Vacant(slot) => {
                slot.insert(id.to_string());
                Ok(())
            }
        }
    }

    fn release_username(&self, username: &str, id: &str) {
        self.usernames.remove_if(username, |_, owner| owner == id);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let Some(id) = self.usernames.get(username).map(|id| id.value().clone()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        self.reserve_username(&user.username, &user.id)?;
        match self.users.entry(user.id.clone()) {
            Entry::Occupied(_) => {
                self.release_username(&user.username, &user.id);
                Err(StoreError::Conflict(format!("user id {}", user.id)))
            }
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(())
            }
        }
    }

    async fn replace(&self, user: User) -> Result<bool, StoreError> {
        let Some(mut existing) = self.users.get_mut(&user.id) else {
            return Ok(false);
        };
        if existing.username != user.username {
            self.reserve_username(&user.username, &user.id)?;
            self.release_username(&existing.username, &user.id);
        }
        *existing = user;
        Ok(true)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        match self.users.remove(id) {
            Some((_, user)) => {
                self.release_username(&user.username, id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let mut todos: Vec<Todo> = self.todos.iter().map(|t| t.value().clone()).collect();
        todos.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(todos)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        Ok(self.todos.get(id).map(|t| t.value().clone()))
    }

    async fn insert(&self, todo: Todo) -> Result<(), StoreError> {
        match self.todos.entry(todo.id.clone()) {
            Entry::Occupied(_) => {
                Err(StoreError::Conflict(format!("todo id {}", todo.id)))
            }
            Entry::Vacant(slot) => {
                slot.insert(todo);
                Ok(())
            }
        }
    }

    async fn replace(&self, todo: Todo) -> Result<bool, StoreError> {
        match self.todos.get_mut(&todo.id) {
            Some(mut existing) => {
                *existing = todo;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.todos.remove(id).is_some())
    }
}
