//! Credential store
//!
//! Persisted user records behind the `UserStore` trait. Email uniqueness is
//! enforced by the store itself (a unique index for Postgres, a single lock
//! for the in-memory map); `create` is the only place `DuplicateEmail`
//! originates.

mod memory;
mod postgres;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::DatabaseError;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Full user record, including the password digest.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Client-facing view of a user. Has no digest field, so it cannot leak one.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub currency: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            currency: user.currency,
        }
    }
}

/// Validated input for `UserStore::create`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub currency: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact, case-sensitive match on the stored email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, DatabaseError>;

    /// Insert a new user. Fails with `DatabaseError::DuplicateEmail` when the
    /// email is already taken, however many callers race for it.
    async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError>;
}
