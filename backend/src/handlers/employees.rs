use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use utoipa::IntoParams;

use crate::{
    config::Config,
    error::AppError,
    models::{
        employee::{CreateEmployee, Employee, EmployeeStats, EmployeeStatus, UpdateEmployee},
        user::User,
        PaginatedResponse, PaginationQuery,
    },
    repositories::{EmployeeFilters, EmployeeRepository, EmployeeRepositoryTrait},
    utils::time,
    validation::Validate,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeListQuery {
    /// Exact department name.
    pub department: Option<String>,
    /// One of `active`, `absent`, `terminated`.
    pub status: Option<String>,
    /// Case-insensitive substring matched against name and email.
    pub search: Option<String>,
    #[serde(default = "crate::models::default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Lists personnel records with optional filters. HR head only.
pub async fn list_employees(
    State((pool, _config)): State<(PgPool, Config)>,
    Query(q): Query<EmployeeListQuery>,
) -> Result<Json<PaginatedResponse<Employee>>, AppError> {
    let pagination = PaginationQuery {
        limit: q.limit,
        offset: q.offset,
    };
    let (limit, offset) = (pagination.limit(), pagination.offset());

    let status = q.status.as_deref().map(parse_status_filter).transpose()?;
    let filters = EmployeeFilters {
        department: q.department,
        status,
        search: q.search,
    };

    let repo = EmployeeRepository::new();
    let rows = repo.find_all(&pool, &filters, limit, offset).await?;
    let total = repo.count(&pool, &filters).await?;

    Ok(Json(PaginatedResponse {
        data: rows,
        total,
        limit,
        offset,
    }))
}

/// Fetches one personnel record. HR head only.
pub async fn get_employee(
    State((pool, _config)): State<(PgPool, Config)>,
    Path(employee_id): Path<String>,
) -> Result<Json<Employee>, AppError> {
    let employee = EmployeeRepository::new()
        .find_by_id(&pool, &employee_id)
        .await?;
    Ok(Json(employee))
}

/// Registers a new personnel record. HR head only.
pub async fn create_employee(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateEmployee>,
) -> Result<Json<Employee>, AppError> {
    payload.validate()?;

    let repo = EmployeeRepository::new();
    ensure_email_available(&repo, &pool, &payload.email, None).await?;

    let employee = Employee::new(
        payload.full_name,
        payload.email,
        payload.department,
        payload.title,
        payload.status,
    );
    let created = repo.create(&pool, &employee).await?;

    tracing::info!(
        employee_id = %created.id,
        requester_id = %user.id,
        "employee record created"
    );
    Ok(Json(created))
}

/// Updates fields of an existing personnel record. HR head only.
pub async fn update_employee(
    State((pool, config)): State<(PgPool, Config)>,
    Path(employee_id): Path<String>,
    Json(payload): Json<UpdateEmployee>,
) -> Result<Json<Employee>, AppError> {
    payload.validate()?;

    let repo = EmployeeRepository::new();
    let mut employee = repo.find_by_id(&pool, &employee_id).await?;

    // A changed address must not collide with another record.
    if let Some(email) = &payload.email {
        if *email != employee.email {
            ensure_email_available(&repo, &pool, email, Some(&employee.id)).await?;
        }
    }

    apply_employee_update(&mut employee, payload);
    employee.updated_at = time::now_utc(&config.time_zone);

    let updated = repo.update(&pool, &employee).await?;
    Ok(Json(updated))
}

/// Removes a personnel record. Linked user accounts keep working; the FK
/// clears their `employee_id`. HR head only.
pub async fn delete_employee(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(employee_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let deleted = EmployeeRepository::new().delete(&pool, &employee_id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Employee not found".into()));
    }

    tracing::info!(
        employee_id = %employee_id,
        requester_id = %user.id,
        "employee record deleted"
    );
    Ok(Json(json!({"message": "Employee deleted"})))
}

/// Head-count totals by employee status. HR head only.
pub async fn get_employee_stats(
    State((pool, _config)): State<(PgPool, Config)>,
) -> Result<Json<EmployeeStats>, AppError> {
    let stats = EmployeeRepository::new().stats(&pool).await?;
    Ok(Json(stats))
}

async fn ensure_email_available(
    repo: &EmployeeRepository,
    pool: &PgPool,
    email: &str,
    exclude_id: Option<&str>,
) -> Result<(), AppError> {
    if let Some(existing) = repo.find_by_email(pool, email).await? {
        if exclude_id != Some(existing.id.as_str()) {
            return Err(AppError::Conflict("Email already exists".into()));
        }
    }
    Ok(())
}

fn apply_employee_update(employee: &mut Employee, payload: UpdateEmployee) {
    if let Some(full_name) = payload.full_name {
        employee.full_name = full_name;
    }
    if let Some(email) = payload.email {
        employee.email = email;
    }
    if let Some(department) = payload.department {
        employee.department = department;
    }
    if let Some(title) = payload.title {
        employee.title = title;
    }
    if let Some(status) = payload.status {
        employee.status = status;
    }
}

fn parse_status_filter(value: &str) -> Result<EmployeeStatus, AppError> {
    match value {
        "active" => Ok(EmployeeStatus::Active),
        "absent" => Ok(EmployeeStatus::Absent),
        "terminated" => Ok(EmployeeStatus::Terminated),
        other => Err(AppError::BadRequest(format!(
            "Unknown status filter '{}'",
            other
        ))),
    }
}
