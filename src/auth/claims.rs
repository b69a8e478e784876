/// Session token claims
///
/// Payload of the signed bearer token: who it was issued to, when, until
/// when, by whom, and a unique id so a single token can be revoked.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Token id (UUID string)
    pub jti: String,
}

impl Claims {
    /// Create claims valid for `expiry_seconds` from now
    pub fn new(user_id: Uuid, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            iat: now,
            exp: now + expiry_seconds,
            iss: issuer,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// A signed token whose subject is not a UUID is treated as malformed.
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::TokenInvalid)
    }

    pub fn token_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.jti).map_err(|_| AuthError::TokenInvalid)
    }

    pub fn is_expired(&self) -> bool {
        self.exp <= chrono::Utc::now().timestamp()
    }
}
