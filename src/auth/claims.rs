use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload. Carries the public user fields, never the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: u64,           // user ID
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub iat: usize,         // issued at (unix timestamp)
    pub exp: usize,         // expires at (unix timestamp)
    pub iss: String,        // issuer
    pub aud: String,        // audience
    pub jti: Uuid,          // token id
}
