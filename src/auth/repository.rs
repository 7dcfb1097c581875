use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{NewUser, UserModel};
use crate::db::{from_micros, to_micros};
use crate::shared::AppError;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    /// Stores a new user, failing with `DuplicateHandle` if the username is taken.
    /// The uniqueness check and the write happen atomically.
    async fn insert(&self, user: NewUser) -> Result<UserModel, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;
}

#[derive(Default)]
struct UserTable {
    next_id: i64,
    by_username: HashMap<String, UserModel>,
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: RwLock<UserTable>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: RwLock::new(UserTable::default()),
        }
    }

    /// Returns the current number of users in the repository
    pub async fn user_count(&self) -> usize {
        self.users.read().await.by_username.len()
    }

    /// Drops a user outright. Only used to simulate accounts that vanish
    /// while a token for them is still in circulation.
    pub async fn remove(&self, username: &str) -> bool {
        self.users.write().await.by_username.remove(username).is_some()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, user: NewUser) -> Result<UserModel, AppError> {
        debug!("Creating user in memory");

        let mut users = self.users.write().await;
        if users.by_username.contains_key(&user.username) {
            warn!("Username already exists in memory");
            return Err(AppError::DuplicateHandle);
        }

        users.next_id += 1;
        let model = user.into_model(users.next_id);
        users
            .by_username
            .insert(model.username.clone(), model.clone());

        debug!(user_id = model.id, "User created successfully in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        debug!("Fetching user from memory");

        let users = self.users.read().await;
        let user = users.by_username.get(username).cloned();

        match &user {
            Some(u) => debug!(user_id = u.id, "User found in memory"),
            None => debug!("User not found in memory"),
        }

        Ok(user)
    }
}

/// SQLite implementation of user repository
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, user: NewUser) -> Result<UserModel, AppError> {
        debug!("Creating user in database");

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(to_micros(&user.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                warn!("Username already exists in database");
                AppError::DuplicateHandle
            }
            _ => {
                warn!(error = %e, "Failed to create user in database");
                AppError::DatabaseError(e.to_string())
            }
        })?;

        let model = user.into_model(result.last_insert_rowid());
        debug!(user_id = model.id, "User created successfully in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        debug!("Fetching user from database");

        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let user = match row {
            Some(row) => {
                let user = UserModel {
                    id: row.try_get("id")?,
                    username: row.try_get("username")?,
                    password_hash: row.try_get("password_hash")?,
                    created_at: from_micros(row.try_get("created_at")?)?,
                };
                debug!(user_id = user.id, "User found in database");
                Some(user)
            }
            None => {
                debug!("User not found in database");
                None
            }
        };

        Ok(user)
    }
}
