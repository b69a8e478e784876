use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{NewUser, User, UserProfile, UserStore};
use crate::error::DatabaseError;

/// Postgres-backed store. Relies on the `users_email_unique` index created
/// by the migrations in `./migrations`.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    currency: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            currency: row.currency,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, currency, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, DatabaseError> {
        // The digest column is deliberately not selected.
        let row = sqlx::query_as::<_, (Uuid, String, String, String)>(
            "SELECT id, name, email, currency FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, email, currency)| UserProfile {
            id,
            name,
            email,
            currency,
        }))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash, currency, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, password_hash, currency, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.currency)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(user_id = %row.id, "User row inserted");
        Ok(row.into())
    }
}
