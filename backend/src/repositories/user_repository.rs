//! User account repository trait for dependency injection and testing.
//!
//! Mock with `MockUserRepositoryTrait` in tests.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::user::User;

const COLUMNS: &str =
    "id, full_name, email, password_hash, LOWER(role) as role, employee_id, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
#[allow(dead_code)]
pub trait UserRepositoryTrait: Send + Sync {
    /// List accounts alphabetically.
    async fn find_all(&self, db: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, AppError>;

    /// Count all accounts.
    async fn count(&self, db: &PgPool) -> Result<i64, AppError>;

    /// Fetch one account or fail with `NotFound`.
    async fn find_by_id(&self, db: &PgPool, id: &str) -> Result<User, AppError>;

    /// Look up an account by its login email.
    async fn find_by_email(&self, db: &PgPool, email: &str) -> Result<Option<User>, AppError>;

    /// Insert a new account and return the stored row.
    async fn create(&self, db: &PgPool, item: &User) -> Result<User, AppError>;

    /// Overwrite an account's mutable fields and return the stored row.
    async fn update(&self, db: &PgPool, item: &User) -> Result<User, AppError>;

    /// Delete an account, returning the number of rows removed.
    async fn delete(&self, db: &PgPool, id: &str) -> Result<u64, AppError>;
}

/// Concrete Postgres implementation of [`UserRepositoryTrait`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn find_all(&self, db: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        let query =
            format!("SELECT {COLUMNS} FROM users ORDER BY full_name ASC LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    async fn count(&self, db: &PgPool) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;
        Ok(total)
    }

    async fn find_by_id(&self, db: &PgPool, id: &str) -> Result<User, AppError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        Ok(row)
    }

    async fn find_by_email(&self, db: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    async fn create(&self, db: &PgPool, item: &User) -> Result<User, AppError> {
        let query = format!(
            "INSERT INTO users (id, full_name, email, password_hash, role, employee_id, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, User>(&query)
            .bind(&item.id)
            .bind(&item.full_name)
            .bind(&item.email)
            .bind(&item.password_hash)
            .bind(item.role.as_str())
            .bind(&item.employee_id)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn update(&self, db: &PgPool, item: &User) -> Result<User, AppError> {
        let query = format!(
            "UPDATE users SET full_name = $2, email = $3, password_hash = $4, role = $5, \
             employee_id = $6, updated_at = $7 WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, User>(&query)
            .bind(&item.id)
            .bind(&item.full_name)
            .bind(&item.email)
            .bind(&item.password_hash)
            .bind(item.role.as_str())
            .bind(&item.employee_id)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn delete(&self, db: &PgPool, id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
