use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::shared::AppError;

const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-users";

/// Argon2 password hashing. Verification reads the parameters from the stored
/// PHC string, so hashes made with different costs still verify.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<OnceLock<String>>,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(Argon2::default())
    }
}

impl CredentialHasher {
    fn new(argon2: Argon2<'static>) -> Self {
        Self {
            argon2,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Argon2id with explicit cost parameters (memory in KiB, iterations, lanes)
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AppError> {
        let params = Params::new(m_cost, t_cost, p_cost, None).map_err(|e| {
            warn!(error = %e, "Invalid argon2 parameters");
            AppError::Validation(format!("Invalid password hashing parameters: {}", e))
        })?;

        Ok(Self::new(Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            params,
        )))
    }

    /// Hashes a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                warn!(error = %e, "Failed to hash password");
                AppError::Internal
            })
    }

    /// Constant-time check of a password against a stored PHC string
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(hash) => hash,
            Err(e) => {
                warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Burns the same work as a real verification for usernames that do not exist
    pub fn verify_dummy(&self, password: &str) {
        debug!("Running dummy password verification");
        match self.dummy_hash() {
            Some(dummy_hash) => {
                let _ = self.verify(password, dummy_hash);
            }
            // Hashing costs the same as verifying
            None => {
                let _ = self.hash(password);
            }
        }
    }

    /// Only a successful hash is cached; a failure is retried on the next call
    fn dummy_hash(&self) -> Option<&str> {
        if let Some(hash) = self.dummy_hash.get() {
            return Some(hash.as_str());
        }

        match self.hash(DUMMY_PASSWORD) {
            Ok(hash) => Some(self.dummy_hash.get_or_init(|| hash).as_str()),
            Err(_) => {
                warn!("Could not build the dummy password hash");
                None
            }
        }
    }
}
