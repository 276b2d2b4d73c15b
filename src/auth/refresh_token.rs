/// Refresh token registry.
///
/// Raw tokens are high-entropy random strings shown to the caller exactly
/// once; only their SHA-256 hash is persisted, so a database read alone never
/// yields a usable credential. Every use rotates the token: the presented
/// record is deleted and replaced in one transaction, which makes each raw
/// value single-use and turns a replayed token into a detectable theft signal.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AuthError};

const RAW_TOKEN_LENGTH: usize = 64;

/// Generate a new refresh token: 64 alphanumeric characters from the thread
/// CSPRNG (~380 bits of entropy). Returned to the caller once, never retained.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RAW_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Persist the hash of a freshly issued refresh token.
pub async fn store_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    token: &str,
    ttl_seconds: i64,
) -> Result<(), AppError> {
    let token_hash = hash_token(token);
    let expires_at = Utc::now() + Duration::seconds(ttl_seconds);

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Consume a presented refresh token and issue its replacement.
///
/// The lookup and invalidation are a single `DELETE ... RETURNING` on the
/// hash's unique index, so when two requests race with the same raw token at
/// most one obtains the row; the other observes an absent record and fails
/// with `RefreshTokenNotFound`. An expired record is purged by the same
/// delete and reported as `RefreshTokenExpired`.
///
/// Returns the owning principal id and the new raw token.
pub async fn validate_and_rotate(
    pool: &PgPool,
    token: &str,
    ttl_seconds: i64,
) -> Result<(Uuid, String), AppError> {
    let token_hash = hash_token(token);

    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
        "DELETE FROM refresh_tokens WHERE token_hash = $1 RETURNING user_id, expires_at",
    )
    .bind(&token_hash)
    .fetch_optional(&mut tx)
    .await?;

    let Some((user_id, expires_at)) = row else {
        tracing::warn!("Unknown refresh token presented; possible replay after rotation");
        return Err(AppError::Auth(AuthError::RefreshTokenNotFound));
    };

    if expires_at < Utc::now() {
        // Keep the delete: the stale record is purged on first use.
        tx.commit().await?;
        tracing::info!(user_id = %user_id, "Expired refresh token purged");
        return Err(AppError::Auth(AuthError::RefreshTokenExpired));
    }

    let new_token = generate_refresh_token();
    let new_expires_at = Utc::now() + Duration::seconds(ttl_seconds);

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(hash_token(&new_token))
    .bind(new_expires_at)
    .bind(Utc::now())
    .execute(&mut tx)
    .await?;

    tx.commit().await?;

    Ok((user_id, new_token))
}

/// Delete a refresh token record by the hash of its raw value. Idempotent:
/// revoking an absent token is not an error.
pub async fn revoke_refresh_token(pool: &PgPool, token: &str) -> Result<(), AppError> {
    let token_hash = hash_token(token);

    sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = $1")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_long_and_alphanumeric() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), RAW_TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn hashing_is_deterministic_and_one_way() {
        let token = generate_refresh_token();
        let hash1 = hash_token(&token);
        let hash2 = hash_token(&token);

        assert_eq!(hash1, hash2);
        assert_ne!(token, hash1);
        // SHA-256 hex digest
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn distinct_tokens_hash_differently() {
        let hash1 = hash_token(&generate_refresh_token());
        let hash2 = hash_token(&generate_refresh_token());
        assert_ne!(hash1, hash2);
    }
}
