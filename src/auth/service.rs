use chrono::Duration;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{NewUser, UserModel},
    password::CredentialHasher,
    repository::UserRepository,
    token::TokenConfig,
    types::IssuedToken,
};
use crate::shared::AppError;

/// Registers users, checks credentials, and issues and validates bearer tokens.
/// Sessions are stateless: the token is the only session artifact.
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
    hasher: CredentialHasher,
}

impl AuthService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>, token_config: TokenConfig) -> Self {
        Self {
            repository,
            token_config,
            hasher: CredentialHasher::default(),
        }
    }

    /// Replaces the default argon2 cost settings
    pub fn with_hasher(mut self, hasher: CredentialHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Creates a new user, storing only a salted hash of the password
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<UserModel, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("Password must not be empty".to_string()));
        }

        let password_hash = self.hash_blocking(password.to_string()).await?;
        let user = self
            .repository
            .insert(NewUser::new(username.to_string(), password_hash))
            .await?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Checks a username/password pair. Unknown users and wrong passwords
    /// fail identically.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserModel, AppError> {
        let user = self.repository.find_by_username(username.trim()).await?;

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || match user {
            Some(user) if hasher.verify(&password, &user.password_hash) => Some(user),
            Some(_) => None,
            None => {
                hasher.verify_dummy(&password);
                None
            }
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "Password verification task failed");
            AppError::Internal
        })?;

        match verified {
            Some(user) => {
                info!(user_id = user.id, "Credentials accepted");
                Ok(user)
            }
            None => {
                warn!("Credentials rejected");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    /// Signs a token for `user` that expires after `ttl`
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub fn issue_token(&self, user: &UserModel, ttl: Duration) -> Result<IssuedToken, AppError> {
        let (access_token, expires_at) = self.token_config.create_token(&user.username, ttl)?;
        info!(expires_at = %expires_at, "Token issued");
        Ok(IssuedToken::bearer(access_token, expires_at))
    }

    /// Authenticates and issues a token with the configured lifetime
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AppError> {
        let user = self.authenticate(username, password).await?;
        self.issue_token(&user, self.token_config.default_ttl)
    }

    /// Resolves a bearer token to a live user
    #[instrument(skip(self, token))]
    pub async fn validate_token(&self, token: &str) -> Result<UserModel, AppError> {
        let claims = self.token_config.validate_token(token)?;

        match self.repository.find_by_username(&claims.sub).await? {
            Some(user) => Ok(user),
            None => {
                warn!(username = %claims.sub, "Token subject not found");
                Err(AppError::UnknownUser(claims.sub))
            }
        }
    }

    async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                warn!(error = %e, "Password hashing task failed");
                AppError::Internal
            })?
    }
}
