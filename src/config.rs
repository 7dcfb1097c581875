//! Runtime configuration read from the environment.
//!
//! `main` loads an optional `.env` file with `dotenvy` before calling
//! [`AppConfig::from_env`], so values can come from either place.

use chrono::Duration;
use tracing::warn;

use crate::auth::token::TokenConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
const DEV_JWT_SECRET: &str = "dev-only-insecure-secret";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// SQLite URL; `None` runs on the in-memory stores
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let ttl_minutes = match get("TOKEN_TTL_MINUTES") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) if minutes > 0 => minutes,
                _ => {
                    warn!(value = %raw, "Invalid TOKEN_TTL_MINUTES, using default");
                    DEFAULT_TOKEN_TTL_MINUTES
                }
            },
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: get("DATABASE_URL"),
            jwt_secret,
            token_ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::new(self.jwt_secret.clone(), self.token_ttl)
    }
}
