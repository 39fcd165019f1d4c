use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::{
        user::{CreateUser, UpdateUser, User, UserResponse},
        PaginatedResponse, PaginationQuery,
    },
    repositories::{
        EmployeeRepository, EmployeeRepositoryTrait, UserRepository, UserRepositoryTrait,
    },
    utils::{password, time},
    validation::Validate,
};

/// Lists user accounts, alphabetically. HR head only.
pub async fn list_users(
    State((pool, _config)): State<(PgPool, Config)>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, AppError> {
    let (limit, offset) = (pagination.limit(), pagination.offset());

    let repo = UserRepository::new();
    let rows = repo.find_all(&pool, limit, offset).await?;
    let total = repo.count(&pool).await?;

    Ok(Json(PaginatedResponse {
        data: rows.into_iter().map(UserResponse::from).collect(),
        total,
        limit,
        offset,
    }))
}

/// Creates a user account with an optional personnel link. HR head only.
pub async fn create_user(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(requester): Extension<User>,
    Json(payload): Json<CreateUser>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let repo = UserRepository::new();
    ensure_email_available(&repo, &pool, &payload.email, None).await?;
    if let Some(employee_id) = &payload.employee_id {
        ensure_employee_exists(&pool, employee_id).await?;
    }

    let password_hash = password::hash_password(&payload.password)?;
    let user = User::new(
        payload.full_name,
        payload.email,
        password_hash,
        payload.role,
        payload.employee_id,
    );
    let created = repo.create(&pool, &user).await?;

    tracing::info!(
        user_id = %created.id,
        requester_id = %requester.id,
        "user account created"
    );
    Ok(Json(UserResponse::from(created)))
}

/// Updates fields of an existing account. HR head only.
pub async fn update_user(
    State((pool, config)): State<(PgPool, Config)>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let repo = UserRepository::new();
    let mut user = repo.find_by_id(&pool, &user_id).await?;

    // A changed address must not collide with another account.
    if let Some(email) = &payload.email {
        if *email != user.email {
            ensure_email_available(&repo, &pool, email, Some(&user.id)).await?;
        }
    }
    if let Some(employee_id) = payload.employee_id.as_ref().and_then(|link| link.as_deref()) {
        ensure_employee_exists(&pool, employee_id).await?;
    }

    apply_user_update(&mut user, payload)?;
    user.updated_at = time::now_utc(&config.time_zone);

    let updated = repo.update(&pool, &user).await?;
    Ok(Json(UserResponse::from(updated)))
}

/// Removes a user account. The account's refresh tokens go with it via the
/// FK cascade. HR head only.
pub async fn delete_user(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(requester): Extension<User>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if requester.id == user_id {
        return Err(AppError::BadRequest("Cannot delete yourself".into()));
    }

    let deleted = UserRepository::new().delete(&pool, &user_id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    tracing::info!(
        user_id = %user_id,
        requester_id = %requester.id,
        "user account deleted"
    );
    Ok(Json(json!({"message": "User deleted"})))
}

async fn ensure_email_available(
    repo: &UserRepository,
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

/// A dangling personnel link is a payload problem, not a missing resource.
async fn ensure_employee_exists(pool: &PgPool, employee_id: &str) -> Result<(), AppError> {
    match EmployeeRepository::new().find_by_id(pool, employee_id).await {
        Ok(_) => Ok(()),
        Err(AppError::NotFound(_)) => Err(AppError::BadRequest(format!(
            "Employee '{}' does not exist",
            employee_id
        ))),
        Err(err) => Err(err),
    }
}

fn apply_user_update(user: &mut User, payload: UpdateUser) -> Result<(), AppError> {
    if let Some(full_name) = payload.full_name {
        user.full_name = full_name;
    }
    if let Some(email) = payload.email {
        user.email = email;
    }
    if let Some(new_password) = payload.password {
        user.password_hash = password::hash_password(&new_password)?;
    }
    if let Some(role) = payload.role {
        user.role = role;
    }
    if let Some(link) = payload.employee_id {
        user.employee_id = link;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    fn sample_user() -> User {
        User::new(
            "Ana Example".into(),
            "ana@example.com".into(),
            password::hash_password("original-pass-9").unwrap(),
            UserRole::Employee,
            Some("emp-1".into()),
        )
    }

    #[test]
    fn partial_update_touches_only_given_fields() {
        let mut user = sample_user();
        let old_hash = user.password_hash.clone();
        apply_user_update(
            &mut user,
            UpdateUser {
                full_name: None,
                email: None,
                password: None,
                role: Some(UserRole::DepartmentHead),
                employee_id: None,
            },
        )
        .unwrap();
        assert_eq!(user.full_name, "Ana Example");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.password_hash, old_hash);
        assert_eq!(user.role, UserRole::DepartmentHead);
        assert_eq!(user.employee_id.as_deref(), Some("emp-1"));
    }

    #[test]
    fn password_change_stores_a_fresh_hash() {
        let mut user = sample_user();
        let old_hash = user.password_hash.clone();
        apply_user_update(
            &mut user,
            UpdateUser {
                full_name: None,
                email: None,
                password: Some("replacement-pass-9".into()),
                role: None,
                employee_id: None,
            },
        )
        .unwrap();
        assert_ne!(user.password_hash, old_hash);
        assert!(password::verify_password("replacement-pass-9", &user.password_hash).unwrap());
    }

    #[test]
    fn explicit_null_clears_the_personnel_link() {
        let mut user = sample_user();
        apply_user_update(
            &mut user,
            UpdateUser {
                full_name: None,
                email: None,
                password: None,
                role: None,
                employee_id: Some(None),
            },
        )
        .unwrap();
        assert_eq!(user.employee_id, None);
    }
}
