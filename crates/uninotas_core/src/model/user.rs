//! User account record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// Signed-in identity as seen by the rest of the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    /// Trimmed, lowercase email.
    pub email: String,
}

/// Stored credential row, never handed outside the auth module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub account: UserAccount,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub created_at: i64,
}

/// Canonical email form used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
