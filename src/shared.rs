use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::service::AuthService;
use crate::expense::repository::ExpenseRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub expense_repository: Arc<dyn ExpenseRepository + Send + Sync>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        expense_repository: Arc<dyn ExpenseRepository + Send + Sync>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            expense_repository,
            auth_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Username is already taken")]
    DuplicateHandle,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Token subject no longer exists: {0}")]
    UnknownUser(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Token failures share one external shape so callers cannot tell which check failed
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AppError::InvalidToken(_)
                | AppError::ExpiredToken
                | AppError::UnknownUser(_)
                | AppError::Unauthorized(_)
        )
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// `Json` body extractor whose rejections use the `{"error": ...}` shape with 400
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_auth_failure() {
            let body = Json(json!({ "error": "Unauthorized" }));
            return (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                body,
            )
                .into_response();
        }

        let message = self.to_string();
        let (status, error_message) = match self {
            AppError::DuplicateHandle => (StatusCode::CONFLICT, message),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, message),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidRange(_) | AppError::InvalidAmount(_) | AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
