use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, instrument};

use super::types::{CredentialsRequest, IssuedToken, UserResponse};
use crate::shared::{AppError, AppJson, AppState};

/// HTTP handler for registering a new user
///
/// POST /register
/// Returns the created user without its password hash
#[instrument(name = "register", skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    info!(username = %request.username, "Registering new user");

    let user = state
        .auth_service
        .register(&request.username, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// HTTP handler for logging in
///
/// POST /login
/// Returns a signed bearer token
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<CredentialsRequest>,
) -> Result<Json<IssuedToken>, AppError> {
    info!(username = %request.username, "Login attempt");

    let token = state
        .auth_service
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(token))
}
