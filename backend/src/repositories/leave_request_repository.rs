//! Leave request repository trait for dependency injection and testing.
//!
//! Mock with `MockLeaveRequestRepositoryTrait` in tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::leave_request::{LeaveCategory, LeaveRequest, LeaveRequestStats, LeaveStatus};
use crate::models::user::UserRole;
use crate::repositories::common::push_clause;

const COLUMNS: &str = "id, requester_id, requester_name, category, reason, start_date, end_date, \
     status, process_stage, decided_by, decided_at, decision_comment, submitted_at, updated_at";

/// Optional narrowing criteria for request listings.
#[derive(Debug, Default, Clone)]
pub struct LeaveRequestFilters {
    pub status: Option<LeaveStatus>,
    pub category: Option<LeaveCategory>,
    pub requester_id: Option<String>,
    pub stage: Option<UserRole>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
#[allow(dead_code)]
pub trait LeaveRequestRepositoryTrait: Send + Sync {
    /// List requests matching the filters, newest first.
    async fn find_all(
        &self,
        db: &PgPool,
        filters: &LeaveRequestFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveRequest>, AppError>;

    /// Count requests matching the filters.
    async fn count(&self, db: &PgPool, filters: &LeaveRequestFilters) -> Result<i64, AppError>;

    /// Fetch a single request or fail with `NotFound`.
    async fn find_by_id(&self, db: &PgPool, id: &str) -> Result<LeaveRequest, AppError>;

    /// All requests submitted by one user, newest first.
    async fn find_by_requester(
        &self,
        db: &PgPool,
        requester_id: &str,
    ) -> Result<Vec<LeaveRequest>, AppError>;

    /// Pending requests parked at the given stage, oldest first.
    async fn find_inbox(&self, db: &PgPool, stage: &UserRole) -> Result<Vec<LeaveRequest>, AppError>;

    /// Insert a new request and return the stored row.
    async fn create(&self, db: &PgPool, item: &LeaveRequest) -> Result<LeaveRequest, AppError>;

    /// Persist an already-computed transition. The row is only written while
    /// it is still pending at `expected_stage`; a concurrent decision makes
    /// this touch zero rows.
    async fn apply_transition(
        &self,
        db: &PgPool,
        item: &LeaveRequest,
        expected_stage: &UserRole,
    ) -> Result<u64, AppError>;

    /// Delete a request, returning the number of rows removed.
    async fn delete(&self, db: &PgPool, id: &str) -> Result<u64, AppError>;

    /// Counters by status across all requests.
    async fn stats(&self, db: &PgPool) -> Result<LeaveRequestStats, AppError>;
}

/// Concrete Postgres implementation of [`LeaveRequestRepositoryTrait`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LeaveRequestRepository;

impl LeaveRequestRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LeaveRequestRepositoryTrait for LeaveRequestRepository {
    async fn find_all(
        &self,
        db: &PgPool,
        filters: &LeaveRequestFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM leave_requests"));
        apply_leave_request_filters(&mut builder, filters);
        builder
            .push(" ORDER BY submitted_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = builder
            .build_query_as::<LeaveRequest>()
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    async fn count(&self, db: &PgPool, filters: &LeaveRequestFilters) -> Result<i64, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM leave_requests");
        apply_leave_request_filters(&mut builder, filters);
        let total = builder.build_query_scalar::<i64>().fetch_one(db).await?;
        Ok(total)
    }

    async fn find_by_id(&self, db: &PgPool, id: &str) -> Result<LeaveRequest, AppError> {
        let query = format!("SELECT {COLUMNS} FROM leave_requests WHERE id = $1");
        let row = sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Leave request not found".into()))?;
        Ok(row)
    }

    async fn find_by_requester(
        &self,
        db: &PgPool,
        requester_id: &str,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let query = format!(
            "SELECT {COLUMNS} FROM leave_requests WHERE requester_id = $1 \
             ORDER BY submitted_at DESC"
        );
        let rows = sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(requester_id)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    async fn find_inbox(
        &self,
        db: &PgPool,
        stage: &UserRole,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let query = format!(
            "SELECT {COLUMNS} FROM leave_requests \
             WHERE status = 'pending' AND process_stage = $1 \
             ORDER BY submitted_at ASC"
        );
        let rows = sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(stage.as_str())
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    async fn create(&self, db: &PgPool, item: &LeaveRequest) -> Result<LeaveRequest, AppError> {
        let query = format!(
            "INSERT INTO leave_requests (id, requester_id, requester_name, category, reason, \
             start_date, end_date, status, process_stage, decided_by, decided_at, \
             decision_comment, submitted_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(&item.id)
            .bind(&item.requester_id)
            .bind(&item.requester_name)
            .bind(item.category.as_str())
            .bind(&item.reason)
            .bind(item.start_date)
            .bind(item.end_date)
            .bind(item.status.as_str())
            .bind(item.process_stage.as_str())
            .bind(&item.decided_by)
            .bind(item.decided_at)
            .bind(&item.decision_comment)
            .bind(item.submitted_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn apply_transition(
        &self,
        db: &PgPool,
        item: &LeaveRequest,
        expected_stage: &UserRole,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE leave_requests SET status = $1, process_stage = $2, decided_by = $3, \
             decided_at = $4, decision_comment = $5, updated_at = $6 \
             WHERE id = $7 AND status = 'pending' AND process_stage = $8",
        )
        .bind(item.status.as_str())
        .bind(item.process_stage.as_str())
        .bind(&item.decided_by)
        .bind(item.decided_at)
        .bind(&item.decision_comment)
        .bind(item.updated_at)
        .bind(&item.id)
        .bind(expected_stage.as_str())
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, db: &PgPool, id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    async fn stats(&self, db: &PgPool) -> Result<LeaveRequestStats, AppError> {
        let row = sqlx::query_as::<_, LeaveRequestStats>(
            "SELECT COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE status = 'pending') AS pending, \
             COUNT(*) FILTER (WHERE status = 'approved') AS approved, \
             COUNT(*) FILTER (WHERE status = 'rejected') AS rejected \
             FROM leave_requests",
        )
        .fetch_one(db)
        .await?;
        Ok(row)
    }
}

fn apply_leave_request_filters<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    filters: &'a LeaveRequestFilters,
) {
    let mut has_clause = false;
    if let Some(ref status) = filters.status {
        push_clause(builder, &mut has_clause);
        builder.push("status = ").push_bind(status.as_str());
    }
    if let Some(ref category) = filters.category {
        push_clause(builder, &mut has_clause);
        builder.push("category = ").push_bind(category.as_str());
    }
    if let Some(ref requester_id) = filters.requester_id {
        push_clause(builder, &mut has_clause);
        builder.push("requester_id = ").push_bind(requester_id);
    }
    if let Some(ref stage) = filters.stage {
        push_clause(builder, &mut has_clause);
        builder.push("process_stage = ").push_bind(stage.as_str());
    }
    if let Some(from) = filters.from {
        push_clause(builder, &mut has_clause);
        builder.push("start_date >= ").push_bind(from);
    }
    if let Some(to) = filters.to {
        push_clause(builder, &mut has_clause);
        builder.push("end_date <= ").push_bind(to);
    }
}
