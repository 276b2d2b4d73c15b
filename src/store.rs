/// Credential store adapter.
///
/// The only component that touches the users table. Everything above it works
/// with `CredentialRecord` values and the narrow query/command interface
/// below, so the storage backend stays swappable behind one seam.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// A stored credential. The password hash never leaves the auth flow: it is
/// not serializable and is skipped by the debug formatter.
pub struct CredentialRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct CredentialStore {
    pool: PgPool,
}

impl CredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a credential by its login handle.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, AppError> {
        let row = sqlx::query_as::<_, (Uuid, String, String, DateTime<Utc>)>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, email, password_hash, created_at)| CredentialRecord {
            id,
            email,
            password_hash,
            created_at,
        }))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CredentialRecord>, AppError> {
        let row = sqlx::query_as::<_, (Uuid, String, String, DateTime<Utc>)>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, email, password_hash, created_at)| CredentialRecord {
            id,
            email,
            password_hash,
            created_at,
        }))
    }

    /// Insert a new credential and return the generated principal id. A
    /// concurrent duplicate surfaces as a unique-constraint violation, which
    /// the error layer maps to 409.
    pub async fn insert(&self, email: &str, password_hash: &str) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn exists(&self, email: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_contains_the_password_hash() {
        let record = CredentialRecord {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$12$secret-material".to_string(),
            created_at: Utc::now(),
        };

        let rendered = format!("{:?}", record);
        assert!(!rendered.contains("secret-material"));
        assert!(rendered.contains("alice@example.com"));
    }
}
