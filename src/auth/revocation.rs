/// Logged-out token ids
///
/// Tokens are not stored server-side, so logout records the token id until
/// the token would have expired anyway. The list lives in process memory:
/// it is shared by all workers of one server but lost on restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct TokenDenylist {
    // token id -> expiry (Unix timestamp)
    revoked: Mutex<HashMap<Uuid, i64>>,
}

impl TokenDenylist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deny `token_id` until `expires_at`. Entries that have expired are
    /// dropped on the way.
    pub fn revoke(&self, token_id: Uuid, expires_at: i64) {
        let now = chrono::Utc::now().timestamp();
        let mut revoked = self.lock();
        revoked.retain(|_, exp| *exp > now);
        if expires_at > now {
            revoked.insert(token_id, expires_at);
        }
    }

    pub fn is_revoked(&self, token_id: &Uuid) -> bool {
        self.lock().contains_key(token_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, i64>> {
        // The map holds plain data; a panic elsewhere cannot leave it inconsistent.
        self.revoked.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
