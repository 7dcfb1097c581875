// Library crate for the expense tracker server
// This file exposes the public API for the binary and integration tests

pub mod auth;
pub mod config;
pub mod db;
pub mod expense;
pub mod routes;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use auth::{
    repository::{InMemoryUserRepository, SqliteUserRepository, UserRepository},
    service::AuthService,
    AuthenticatedUser, IssuedToken, UserResponse,
};
pub use config::AppConfig;
pub use db::Database;
pub use expense::{
    repository::{ExpenseRepository, InMemoryExpenseRepository, SqliteExpenseRepository},
    ExpenseRange, ExpenseResponse, ExpenseService, ExpenseSummary,
};
pub use routes::build_router;
pub use shared::{AppError, AppState};
