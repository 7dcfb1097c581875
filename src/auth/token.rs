use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::{debug, instrument, warn};

use super::types::TokenClaims;
use crate::shared::AppError;

/// Configuration for JWT token operations.
/// The secret is fixed at startup and never changes afterwards.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub default_ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: String, default_ttl: Duration) -> Self {
        Self {
            secret,
            default_ttl,
        }
    }

    /// Signs a token for `username` that expires `ttl` from now
    #[instrument(skip(self))]
    pub fn create_token(
        &self,
        username: &str,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let expires_at = now + ttl;

        debug!(
            ttl_seconds = ttl.num_seconds(),
            exp_timestamp = expires_at.timestamp(),
            "Creating JWT token with expiration"
        );

        let claims = TokenClaims {
            sub: username.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            warn!(error = %e, "Failed to encode JWT token");
            AppError::Internal
        })?;

        Ok((token, expires_at))
    }

    /// Verifies signature and expiry, returning the claims if both hold
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, AppError> {
        debug!("Decoding and validating JWT token");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map(|data| {
            debug!(
                username = %data.claims.sub,
                exp = data.claims.exp,
                "JWT token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::InvalidToken(e.to_string()),
            }
        })
    }
}
