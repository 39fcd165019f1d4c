use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::{models::user::User, utils::jwt::RefreshToken};

#[derive(Debug, FromRow)]
pub struct StoredRefreshToken {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, full_name, email, password_hash, LOWER(role) as role, employee_id, \
         created_at, updated_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_user_by_id(pool: &PgPool, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, full_name, email, password_hash, LOWER(role) as role, employee_id, \
         created_at, updated_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn insert_refresh_token(pool: &PgPool, token: &RefreshToken) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&token.id)
    .bind(&token.user_id)
    .bind(&token.token_hash)
    .bind(token.expires_at)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map(|_| ())
}

/// Marks one token revoked. Revoked rows stay in place until the cleanup
/// job prunes them.
pub async fn revoke_refresh_token_by_id(
    pool: &PgPool,
    token_id: &str,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE refresh_tokens SET revoked_at = $2 WHERE id = $1 AND revoked_at IS NULL")
        .bind(token_id)
        .bind(now)
        .execute(pool)
        .await
        .map(|_| ())
}

pub async fn revoke_refresh_token_for_user(
    pool: &PgPool,
    token_id: &str,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = $3 \
         WHERE id = $1 AND user_id = $2 AND revoked_at IS NULL",
    )
    .bind(token_id)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await
    .map(|_| ())
}

pub async fn revoke_refresh_tokens_for_user(
    pool: &PgPool,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = $2 WHERE user_id = $1 AND revoked_at IS NULL",
    )
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await
    .map(|_| ())
}

pub async fn fetch_valid_refresh_token(
    pool: &PgPool,
    token_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<StoredRefreshToken>, sqlx::Error> {
    sqlx::query_as::<_, StoredRefreshToken>(
        "SELECT id, user_id, token_hash, expires_at FROM refresh_tokens \
         WHERE id = $1 AND revoked_at IS NULL AND expires_at > $2",
    )
    .bind(token_id)
    .bind(now)
    .fetch_optional(pool)
    .await
}

/// Removes rows no exchange can ever accept again: expired or revoked.
/// Run by the `token_cleanup` bin.
pub async fn delete_dead_refresh_tokens(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1 OR revoked_at IS NOT NULL")
        .bind(now)
        .execute(pool)
        .await
        .map(|result| result.rows_affected())
}
