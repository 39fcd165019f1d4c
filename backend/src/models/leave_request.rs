use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::UserRole;

/// A leave request moving through the review chain.
///
/// After creation only `status`, `process_stage` and the decision fields
/// change; everything the requester submitted is frozen.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveRequest {
    pub id: String,
    pub requester_id: String,
    /// Display name captured at submission time, kept even if the account
    /// is later renamed or removed.
    pub requester_name: String,
    pub category: LeaveCategory,
    pub reason: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    /// Reviewer role that must act next. Frozen once the request is decided,
    /// so a rejected request still shows where in the chain it died.
    pub process_stage: UserRole,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveCategory {
    Vacation,
    Personal,
    Medical,
}

impl LeaveCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveCategory::Vacation => "vacation",
            LeaveCategory::Personal => "personal",
            LeaveCategory::Medical => "medical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLeaveRequest {
    pub category: LeaveCategory,
    #[validate(length(min = 1, max = 1000, message = "reason must be 1-1000 characters"))]
    pub reason: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Body accepted by the advance and reject endpoints.
pub struct DecisionPayload {
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequestResponse {
    pub id: String,
    pub requester_id: String,
    pub requester_name: String,
    pub category: LeaveCategory,
    pub reason: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    pub process_stage: UserRole,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl From<LeaveRequest> for LeaveRequestResponse {
    fn from(request: LeaveRequest) -> Self {
        LeaveRequestResponse {
            id: request.id,
            requester_id: request.requester_id,
            requester_name: request.requester_name,
            category: request.category,
            reason: request.reason,
            start_date: request.start_date,
            end_date: request.end_date,
            status: request.status,
            process_stage: request.process_stage,
            decided_by: request.decided_by,
            decided_at: request.decided_at,
            decision_comment: request.decision_comment,
            submitted_at: request.submitted_at,
        }
    }
}

/// Request counters shown on the review dashboard.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveRequestStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl LeaveRequest {
    pub fn new(
        requester_id: String,
        requester_name: String,
        category: LeaveCategory,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: String,
        initial_stage: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            requester_id,
            requester_name,
            category,
            reason,
            start_date,
            end_date,
            status: LeaveStatus::Pending,
            process_stage: initial_stage,
            decided_by: None,
            decided_at: None,
            decision_comment: None,
            submitted_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, LeaveStatus::Pending)
    }

    /// Records the terminal approval. The stage keeps its final value.
    pub fn mark_approved(
        &mut self,
        decided_by: String,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status = LeaveStatus::Approved;
        self.decided_by = Some(decided_by);
        self.decided_at = Some(now);
        self.decision_comment = comment;
        self.updated_at = now;
    }

    /// Records the terminal rejection. The stage keeps its current value.
    pub fn mark_rejected(
        &mut self,
        decided_by: String,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status = LeaveStatus::Rejected;
        self.decided_by = Some(decided_by);
        self.decided_at = Some(now);
        self.decision_comment = comment;
        self.updated_at = now;
    }

    /// Hands the request to the next reviewer; it stays pending.
    pub fn move_to_stage(&mut self, stage: UserRole, now: DateTime<Utc>) {
        self.process_stage = stage;
        self.updated_at = now;
    }
}
