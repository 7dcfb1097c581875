// Public API - what other modules can use
pub use handlers::{login, register};
pub use middleware::jwt_auth;
pub use types::{AuthenticatedUser, IssuedToken, TokenClaims, UserResponse};

// Internal modules
mod handlers;
mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;
mod types;
