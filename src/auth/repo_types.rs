use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// User record as stored in `users.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(rename = "password")]
    pub password_hash: String, // argon2 PHC string, never plaintext
    #[serde(default = "unknown_creation", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn unknown_creation() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

/// Top-level shape of `users.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersDocument {
    #[serde(default)]
    pub users: Vec<User>,
}

/// Validated signup data, ready to be stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: String,
    pub password_hash: String,
}
