use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{NewUser, User, UserProfile, UserStore};
use crate::error::DatabaseError;

/// Process-local store used by the test suite and for running without Postgres.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: Mutex<Users>,
}

#[derive(Default)]
struct Users {
    by_id: HashMap<Uuid, User>,
    // email -> id, the uniqueness index
    by_email: HashMap<String, Uuid>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|users| users.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a user, e.g. to simulate an account deleted after its token
    /// was issued.
    pub fn remove(&self, id: Uuid) -> Option<User> {
        let mut users = self.lock().ok()?;
        let user = users.by_id.remove(&id)?;
        users.by_email.remove(&user.email);
        Some(user)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Users>, DatabaseError> {
        self.inner
            .lock()
            .map_err(|_| DatabaseError::ConnectionPool("user store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.lock()?;
        Ok(users
            .by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, DatabaseError> {
        let users = self.lock()?;
        Ok(users.by_id.get(&id).cloned().map(UserProfile::from))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.lock()?;
        if users.by_email.contains_key(&new_user.email) {
            return Err(DatabaseError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            currency: new_user.currency,
            created_at: Utc::now(),
        };
        users.by_email.insert(user.email.clone(), user.id);
        users.by_id.insert(user.id, user.clone());
        Ok(user)
    }
}
