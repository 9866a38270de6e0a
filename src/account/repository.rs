//! PostgreSQL-backed store

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;

use super::models::{Todo, User};
use super::store::{StoreError, TodoStore, UserStore};

const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// PostgreSQL connection pool implementing both stores
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new connection pool and make sure the tables exist
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }
}

fn map_write_error(err: sqlx::Error, what: String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(what),
        _ => StoreError::Database(err),
    }
}

fn user_from_row(r: &PgRow) -> User {
    User {
        id: r.get("id"),
        name: r.get("name"),
        username: r.get("username"),
        password_hash: r.get("password_hash"),
        scope: r.get("scope"),
    }
}

fn todo_from_row(r: &PgRow) -> Todo {
    Todo {
        id: r.get("id"),
        title: r.get("title"),
        status: r.get("status"),
        owner_id: r.get("owner_id"),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"SELECT id, name, username, password_hash, scope
               FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"SELECT id, name, username, password_hash, scope
               FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT id, name, username, password_hash, scope
               FROM users ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO users (id, name, username, password_hash, scope)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.scope)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, format!("user {}", user.username)))?;
        Ok(())
    }

    async fn replace(&self, user: User) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"UPDATE users SET name = $2, username = $3, password_hash = $4, scope = $5
               WHERE id = $1"#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.scope)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, format!("user {}", user.username)))?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let rows = sqlx::query("SELECT id, title, status, owner_id FROM todos ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(todo_from_row).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        let row = sqlx::query("SELECT id, title, status, owner_id FROM todos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(todo_from_row))
    }

    async fn insert(&self, todo: Todo) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO todos (id, title, status, owner_id) VALUES ($1, $2, $3, $4)")
            .bind(&todo.id)
            .bind(&todo.title)
            .bind(&todo.status)
            .bind(&todo.owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, format!("todo {}", todo.id)))?;
        Ok(())
    }

    async fn replace(&self, todo: Todo) -> Result<bool, StoreError> {
        let res =
            sqlx::query("UPDATE todos SET title = $2, status = $3, owner_id = $4 WHERE id = $1")
                .bind(&todo.id)
                .bind(&todo.title)
                .bind(&todo.status)
                .bind(&todo.owner_id)
                .execute(&self.pool)
                .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
