use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    handlers::auth_repo::{self, StoredRefreshToken},
    models::user::{LoginRequest, LoginResponse, User, UserResponse},
    utils::{
        jwt::{create_access_token, create_refresh_token, decode_refresh_token, verify_refresh_token},
        password::verify_password,
        time,
    },
};

pub async fn login(
    State((pool, config)): State<(PgPool, Config)>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = auth_repo::find_user_by_email(&pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    ensure_password_matches(&payload.password, &user.password_hash)?;

    let tokens = issue_token_pair(&pool, &config, &user).await?;

    Ok(Json(LoginResponse {
        access_token: tokens.0,
        refresh_token: tokens.1,
        user: UserResponse::from(user),
    }))
}

pub async fn refresh(
    State((pool, config)): State<(PgPool, Config)>,
    Json(payload): Json<Value>,
) -> Result<Json<LoginResponse>, AppError> {
    let refresh_token = payload
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::BadRequest("Refresh token is required".into()))?;
    let (refresh_token_id, refresh_token_secret) = decode_refresh_token(refresh_token)
        .map_err(|_| AppError::Unauthorized("Invalid or expired refresh token".into()))?;

    let token_record = fetch_refresh_token_or_unauthorized(&pool, &config, &refresh_token_id).await?;
    verify_refresh_secret(&refresh_token_secret, &token_record.token_hash)?;

    let user = auth_repo::find_user_by_id(&pool, &token_record.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    // Rotation: the presented token dies with this exchange.
    auth_repo::revoke_refresh_token_by_id(
        &pool,
        &refresh_token_id,
        time::now_utc(&config.time_zone),
    )
    .await?;
    let tokens = issue_token_pair(&pool, &config, &user).await?;

    Ok(Json(LoginResponse {
        access_token: tokens.0,
        refresh_token: tokens.1,
        user: UserResponse::from(user),
    }))
}

/// Returns the authenticated account's own profile.
pub async fn me(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

pub async fn logout(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let now = time::now_utc(&config.time_zone);
    let all = payload
        .get("all")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if all {
        auth_repo::revoke_refresh_tokens_for_user(&pool, &user.id, now).await?;
        return Ok(Json(json!({"message": "Logged out"})));
    }

    if let Some(rt) = payload.get("refresh_token").and_then(|v| v.as_str()) {
        let (token_id, _) = decode_refresh_token(rt)
            .map_err(|_| AppError::BadRequest("Invalid refresh token".into()))?;
        auth_repo::revoke_refresh_token_for_user(&pool, &token_id, &user.id, now).await?;
        return Ok(Json(json!({"message": "Logged out"})));
    }

    auth_repo::revoke_refresh_tokens_for_user(&pool, &user.id, now).await?;
    Ok(Json(json!({"message": "Logged out"})))
}

/// Mints a fresh access/refresh pair and stores the refresh half.
async fn issue_token_pair(
    pool: &PgPool,
    config: &Config,
    user: &User,
) -> Result<(String, String), AppError> {
    let access_token = create_access_token(
        user.id.clone(),
        user.email.clone(),
        user.role.as_str().to_string(),
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )?;

    let refresh_token = create_refresh_token(user.id.clone(), config.refresh_token_expiration_days)?;
    auth_repo::insert_refresh_token(pool, &refresh_token).await?;

    Ok((access_token, refresh_token.encoded()))
}

fn ensure_password_matches(candidate: &str, expected_hash: &str) -> Result<(), AppError> {
    let matches = verify_password(candidate, expected_hash)?;
    if matches {
        Ok(())
    } else {
        Err(AppError::Unauthorized("Invalid email or password".into()))
    }
}

fn verify_refresh_secret(secret: &str, hash: &str) -> Result<(), AppError> {
    let valid = verify_refresh_token(secret, hash)?;
    if valid {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "Invalid or expired refresh token".into(),
        ))
    }
}

async fn fetch_refresh_token_or_unauthorized(
    pool: &PgPool,
    config: &Config,
    token_id: &str,
) -> Result<StoredRefreshToken, AppError> {
    auth_repo::fetch_valid_refresh_token(pool, token_id, time::now_utc(&config.time_zone))
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".into()))
}
