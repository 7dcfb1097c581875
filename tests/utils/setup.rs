use axum::Router;
use chrono::Duration;
use std::sync::Arc;

use expense_tracker::{
    auth::{password::CredentialHasher, token::TokenConfig},
    build_router, AppState, AuthService, Database, ExpenseRepository, InMemoryExpenseRepository,
    InMemoryUserRepository, SqliteExpenseRepository, SqliteUserRepository, UserRepository,
};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Argon2 with minimal cost so tests do not spend seconds per hash
pub fn fast_hasher() -> CredentialHasher {
    CredentialHasher::with_params(1024, 1, 1).expect("valid argon2 parameters")
}

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub auth_service: Arc<AuthService>,
    pub database: Option<Database>,
}

pub struct TestAppBuilder {
    use_sqlite: bool,
    token_ttl: Duration,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            use_sqlite: false,
            token_ttl: Duration::minutes(30),
        }
    }

    /// Back the app with a fresh `sqlite::memory:` database instead of the in-memory stores
    pub fn with_sqlite(mut self) -> Self {
        self.use_sqlite = true;
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub async fn build(self) -> TestApp {
        let (database, user_repository, expense_repository): (
            Option<Database>,
            Arc<dyn UserRepository + Send + Sync>,
            Arc<dyn ExpenseRepository + Send + Sync>,
        ) = if self.use_sqlite {
            let database = Database::in_memory().await.unwrap();
            database.migrate().await.unwrap();
            let users = Arc::new(SqliteUserRepository::new(database.pool()));
            let expenses = Arc::new(SqliteExpenseRepository::new(database.pool()));
            (Some(database), users, expenses)
        } else {
            (
                None,
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryExpenseRepository::new()),
            )
        };

        let auth_service = Arc::new(
            AuthService::new(
                user_repository,
                TokenConfig::new(TEST_SECRET.to_string(), self.token_ttl),
            )
            .with_hasher(fast_hasher()),
        );

        let router = build_router(AppState::new(expense_repository, Arc::clone(&auth_service)));

        TestApp {
            router,
            auth_service,
            database,
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
