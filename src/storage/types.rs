use crate::providers::Message;
use serde::{Deserialize, Serialize};

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Auto-incrementing primary key
    pub id: i64,
    /// Unique login name
    pub username: String,
    /// Argon2 PHC string; never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Preferred reply language, e.g. "en"
    pub language: String,
    /// Conversation so far, oldest first. Empty when the stored column was
    /// NULL or could not be decoded.
    pub history: Vec<Message>,
}
