//! Personnel record repository trait for dependency injection and testing.
//!
//! Mock with `MockEmployeeRepositoryTrait` in tests.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::employee::{Employee, EmployeeStats, EmployeeStatus};
use crate::repositories::common::push_clause;

const COLUMNS: &str =
    "id, full_name, email, department, title, status, created_at, updated_at";

/// Optional narrowing criteria for roster listings.
#[derive(Debug, Default, Clone)]
pub struct EmployeeFilters {
    pub department: Option<String>,
    pub status: Option<EmployeeStatus>,
    /// Case-insensitive substring match against name and email.
    pub search: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
#[allow(dead_code)]
pub trait EmployeeRepositoryTrait: Send + Sync {
    /// List records matching the filters, alphabetically.
    async fn find_all(
        &self,
        db: &PgPool,
        filters: &EmployeeFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Employee>, AppError>;

    /// Count records matching the filters.
    async fn count(&self, db: &PgPool, filters: &EmployeeFilters) -> Result<i64, AppError>;

    /// Fetch one record or fail with `NotFound`.
    async fn find_by_id(&self, db: &PgPool, id: &str) -> Result<Employee, AppError>;

    /// Look up a record by its work email.
    async fn find_by_email(&self, db: &PgPool, email: &str) -> Result<Option<Employee>, AppError>;

    /// Insert a new record and return the stored row.
    async fn create(&self, db: &PgPool, item: &Employee) -> Result<Employee, AppError>;

    /// Overwrite a record's mutable fields and return the stored row.
    async fn update(&self, db: &PgPool, item: &Employee) -> Result<Employee, AppError>;

    /// Delete a record, returning the number of rows removed.
    async fn delete(&self, db: &PgPool, id: &str) -> Result<u64, AppError>;

    /// Head-count by employment status.
    async fn stats(&self, db: &PgPool) -> Result<EmployeeStats, AppError>;
}

/// Concrete Postgres implementation of [`EmployeeRepositoryTrait`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EmployeeRepository;

impl EmployeeRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmployeeRepositoryTrait for EmployeeRepository {
    async fn find_all(
        &self,
        db: &PgPool,
        filters: &EmployeeFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Employee>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM employees"));
        apply_employee_filters(&mut builder, filters);
        builder
            .push(" ORDER BY full_name ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = builder.build_query_as::<Employee>().fetch_all(db).await?;
        Ok(rows)
    }

    async fn count(&self, db: &PgPool, filters: &EmployeeFilters) -> Result<i64, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM employees");
        apply_employee_filters(&mut builder, filters);
        let total = builder.build_query_scalar::<i64>().fetch_one(db).await?;
        Ok(total)
    }

    async fn find_by_id(&self, db: &PgPool, id: &str) -> Result<Employee, AppError> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1");
        let row = sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;
        Ok(row)
    }

    async fn find_by_email(&self, db: &PgPool, email: &str) -> Result<Option<Employee>, AppError> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE email = $1");
        let row = sqlx::query_as::<_, Employee>(&query)
            .bind(email)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    async fn create(&self, db: &PgPool, item: &Employee) -> Result<Employee, AppError> {
        let query = format!(
            "INSERT INTO employees (id, full_name, email, department, title, status, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Employee>(&query)
            .bind(&item.id)
            .bind(&item.full_name)
            .bind(&item.email)
            .bind(&item.department)
            .bind(&item.title)
            .bind(item.status.as_str())
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn update(&self, db: &PgPool, item: &Employee) -> Result<Employee, AppError> {
        let query = format!(
            "UPDATE employees SET full_name = $2, email = $3, department = $4, title = $5, \
             status = $6, updated_at = $7 WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Employee>(&query)
            .bind(&item.id)
            .bind(&item.full_name)
            .bind(&item.email)
            .bind(&item.department)
            .bind(&item.title)
            .bind(item.status.as_str())
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn delete(&self, db: &PgPool, id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    async fn stats(&self, db: &PgPool) -> Result<EmployeeStats, AppError> {
        let row = sqlx::query_as::<_, EmployeeStats>(
            "SELECT COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE status = 'active') AS active, \
             COUNT(*) FILTER (WHERE status = 'absent') AS absent, \
             COUNT(*) FILTER (WHERE status = 'terminated') AS terminated \
             FROM employees",
        )
        .fetch_one(db)
        .await?;
        Ok(row)
    }
}

fn apply_employee_filters<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    filters: &'a EmployeeFilters,
) {
    let mut has_clause = false;
    if let Some(ref department) = filters.department {
        push_clause(builder, &mut has_clause);
        builder.push("department = ").push_bind(department);
    }
    if let Some(ref status) = filters.status {
        push_clause(builder, &mut has_clause);
        builder.push("status = ").push_bind(status.as_str());
    }
    if let Some(ref search) = filters.search {
        let pattern = format!("%{}%", search);
        push_clause(builder, &mut has_clause);
        builder
            .push("(full_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
