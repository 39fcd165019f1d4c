use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use utoipa::IntoParams;

use crate::{
    config::Config,
    error::AppError,
    models::{
        leave_request::{
            CreateLeaveRequest, DecisionPayload, LeaveCategory, LeaveRequest,
            LeaveRequestResponse, LeaveRequestStats, LeaveStatus,
        },
        user::{User, UserRole},
        PaginatedResponse, PaginationQuery,
    },
    repositories::{LeaveRequestFilters, LeaveRequestRepository, LeaveRequestRepositoryTrait},
    utils::time,
    validation::Validate,
};

const MAX_DECISION_COMMENT_LENGTH: usize = 500;

/// Submits a new leave request for the authenticated user. The request
/// enters the review chain at the stage appropriate to the requester's role.
pub async fn submit_request(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateLeaveRequest>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    payload.validate()?;
    if !is_valid_leave_window(payload.start_date, payload.end_date) {
        return Err(AppError::Validation(vec![
            "end_date: must not precede start_date".into(),
        ]));
    }

    let initial_stage = config.approval_chain.initial_stage(&user.role);
    let request = LeaveRequest::new(
        user.id,
        user.full_name,
        payload.category,
        payload.start_date,
        payload.end_date,
        payload.reason,
        initial_stage,
    );

    let created = LeaveRequestRepository::new().create(&pool, &request).await?;
    Ok(Json(LeaveRequestResponse::from(created)))
}

/// Lists the authenticated user's own requests, newest first.
pub async fn get_my_requests(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<LeaveRequestResponse>>, AppError> {
    let rows = LeaveRequestRepository::new()
        .find_by_requester(&pool, &user.id)
        .await?;
    Ok(Json(rows.into_iter().map(LeaveRequestResponse::from).collect()))
}

/// Fetches one request. Visible to its requester and to reviewers.
pub async fn get_request_detail(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    let request = LeaveRequestRepository::new()
        .find_by_id(&pool, &request_id)
        .await?;
    if request.requester_id != user.id && !user.is_reviewer() {
        return Err(AppError::Forbidden(
            "You do not have access to this request".into(),
        ));
    }
    Ok(Json(LeaveRequestResponse::from(request)))
}

/// Lists pending requests waiting at the reviewer's own stage, oldest first.
pub async fn get_inbox(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<LeaveRequestResponse>>, AppError> {
    let rows = LeaveRequestRepository::new()
        .find_inbox(&pool, &user.role)
        .await?;
    Ok(Json(rows.into_iter().map(LeaveRequestResponse::from).collect()))
}

/// Moves a pending request one stage forward, approving it when the acting
/// reviewer owns the final stage.
pub async fn advance_request(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
    Json(payload): Json<DecisionPayload>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    let comment = validate_decision_comment(payload.comment)?;
    let repo = LeaveRequestRepository::new();
    let mut request = repo.find_by_id(&pool, &request_id).await?;

    let expected_stage = request.process_stage.clone();
    let now = time::now_utc(&config.time_zone);
    config
        .approval_chain
        .advance(&mut request, &user, comment, now)?;

    persist_transition(&repo, &pool, &request, &expected_stage).await?;
    Ok(Json(LeaveRequestResponse::from(request)))
}

/// Rejects a pending request at its current stage. Terminal.
pub async fn reject_request(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(request_id): Path<String>,
    Json(payload): Json<DecisionPayload>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    let comment = validate_decision_comment(payload.comment)?;
    let repo = LeaveRequestRepository::new();
    let mut request = repo.find_by_id(&pool, &request_id).await?;

    let expected_stage = request.process_stage.clone();
    let now = time::now_utc(&config.time_zone);
    config
        .approval_chain
        .reject(&mut request, &user, comment, now)?;

    persist_transition(&repo, &pool, &request, &expected_stage).await?;
    Ok(Json(LeaveRequestResponse::from(request)))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RequestListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub requester_id: Option<String>,
    pub stage: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default = "crate::models::default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Lists all requests with optional filters. HR head only.
pub async fn list_requests(
    State((pool, _config)): State<(PgPool, Config)>,
    Query(q): Query<RequestListQuery>,
) -> Result<Json<PaginatedResponse<LeaveRequestResponse>>, AppError> {
    let filters = build_filters(&q)?;
    let pagination = PaginationQuery {
        limit: q.limit,
        offset: q.offset,
    };
    let (limit, offset) = (pagination.limit(), pagination.offset());

    let repo = LeaveRequestRepository::new();
    let rows = repo.find_all(&pool, &filters, limit, offset).await?;
    let total = repo.count(&pool, &filters).await?;

    Ok(Json(PaginatedResponse {
        data: rows.into_iter().map(LeaveRequestResponse::from).collect(),
        total,
        limit,
        offset,
    }))
}

/// Removes a request outright. HR head only.
pub async fn delete_request(
    State((pool, _config)): State<(PgPool, Config)>,
    Path(request_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let deleted = LeaveRequestRepository::new()
        .delete(&pool, &request_id)
        .await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Leave request not found".into()));
    }
    Ok(Json(json!({"message": "Leave request deleted"})))
}

/// Request counters by status. HR head only.
pub async fn get_request_stats(
    State((pool, _config)): State<(PgPool, Config)>,
) -> Result<Json<LeaveRequestStats>, AppError> {
    let stats = LeaveRequestRepository::new().stats(&pool).await?;
    Ok(Json(stats))
}

/// Writes a computed transition, guarded on the pre-transition state. Zero
/// rows means a concurrent actor got there first.
async fn persist_transition(
    repo: &LeaveRequestRepository,
    pool: &PgPool,
    request: &LeaveRequest,
    expected_stage: &UserRole,
) -> Result<(), AppError> {
    let updated = repo
        .apply_transition(pool, request, expected_stage)
        .await?;
    if updated == 0 {
        tracing::warn!(
            request_id = %request.id,
            stage = %expected_stage.as_str(),
            "leave request transition lost a concurrent race"
        );
        // NotFound if the row vanished entirely, Conflict otherwise.
        repo.find_by_id(pool, &request.id).await?;
        return Err(AppError::Conflict(
            "Request was decided by someone else".into(),
        ));
    }
    Ok(())
}

fn build_filters(q: &RequestListQuery) -> Result<LeaveRequestFilters, AppError> {
    let status = q.status.as_deref().map(parse_status_filter).transpose()?;
    let category = q.category.as_deref().map(parse_category_filter).transpose()?;
    let stage = q.stage.as_deref().map(parse_stage_filter).transpose()?;

    Ok(LeaveRequestFilters {
        status,
        category,
        requester_id: q.requester_id.clone(),
        stage,
        from: q.from,
        to: q.to,
    })
}

fn parse_status_filter(value: &str) -> Result<LeaveStatus, AppError> {
    match value {
        "pending" => Ok(LeaveStatus::Pending),
        "approved" => Ok(LeaveStatus::Approved),
        "rejected" => Ok(LeaveStatus::Rejected),
        other => Err(AppError::BadRequest(format!(
            "Unknown status filter '{}'",
            other
        ))),
    }
}

fn parse_category_filter(value: &str) -> Result<LeaveCategory, AppError> {
    match value {
        "vacation" => Ok(LeaveCategory::Vacation),
        "personal" => Ok(LeaveCategory::Personal),
        "medical" => Ok(LeaveCategory::Medical),
        other => Err(AppError::BadRequest(format!(
            "Unknown category filter '{}'",
            other
        ))),
    }
}

fn parse_stage_filter(value: &str) -> Result<UserRole, AppError> {
    match value {
        "department_head" => Ok(UserRole::DepartmentHead),
        "hr_head" => Ok(UserRole::HrHead),
        other => Err(AppError::BadRequest(format!(
            "Unknown stage filter '{}'",
            other
        ))),
    }
}

fn is_valid_leave_window(start: NaiveDate, end: NaiveDate) -> bool {
    start <= end
}

fn validate_decision_comment(comment: Option<String>) -> Result<Option<String>, AppError> {
    let Some(comment) = comment else {
        return Ok(None);
    };
    if comment.trim().is_empty() {
        return Ok(None);
    }
    if comment.chars().count() > MAX_DECISION_COMMENT_LENGTH {
        return Err(AppError::Validation(vec![format!(
            "comment: must be at most {} characters",
            MAX_DECISION_COMMENT_LENGTH
        )]));
    }
    Ok(Some(comment))
}
