use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Database model for users table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub id: i64,               // Assigned by the store on insert
    pub username: String,      // Unique handle
    pub password_hash: String, // Argon2 PHC string, never the plaintext
    pub created_at: DateTime<Utc>,
}

/// A user that has not been stored yet
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            username,
            password_hash,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    /// Attaches the store-assigned id
    pub fn into_model(self, id: i64) -> UserModel {
        UserModel {
            id,
            username: self.username,
            password_hash: self.password_hash,
            created_at: self.created_at,
        }
    }
}
