use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use sqlx::PgPool;

use crate::{config::Config, models::user::User, utils::jwt::Claims};

/// Requires a valid bearer token. Inserts the verified [`Claims`] and the
/// loaded [`User`] as request extensions for the handlers downstream.
pub async fn auth(
    State((pool, config)): State<(PgPool, Config)>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = extract_auth_header(request.headers());
    let (claims, user) = authenticate_request(auth_header.as_deref(), &pool, &config).await?;
    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Auth + require a reviewer role for review routes.
pub async fn auth_reviewer(
    State((pool, config)): State<(PgPool, Config)>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = extract_auth_header(request.headers());
    let (claims, user) = authenticate_request(auth_header.as_deref(), &pool, &config).await?;
    if !user.is_reviewer() {
        return Err(StatusCode::FORBIDDEN);
    }

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Auth + require the HR head role for administrative routes.
pub async fn auth_hr(
    State((pool, config)): State<(PgPool, Config)>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = extract_auth_header(request.headers());
    let (claims, user) = authenticate_request(auth_header.as_deref(), &pool, &config).await?;
    if !user.is_hr_head() {
        return Err(StatusCode::FORBIDDEN);
    }

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

async fn get_user_by_id(pool: &PgPool, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, full_name, email, password_hash, LOWER(role) as role, employee_id, \
         created_at, updated_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    if let Some(rest) = header.strip_prefix("Bearer ") {
        return Some(rest);
    }
    if let Some(rest) = header.strip_prefix("bearer ") {
        return Some(rest);
    }
    if let Some(space_idx) = header.find(' ') {
        let (scheme, rest) = header.split_at(space_idx);
        if scheme.eq_ignore_ascii_case("bearer") {
            return Some(rest.trim_start());
        }
    }
    None
}

async fn authenticate_request(
    auth_header: Option<&str>,
    pool: &PgPool,
    config: &Config,
) -> Result<(Claims, User), StatusCode> {
    let token = auth_header
        .and_then(parse_bearer_token)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|_| StatusCode::UNAUTHORIZED)?;

    // The token's subject must still exist; deleted accounts lose access
    // immediately even with an unexpired token.
    let user = get_user_by_id(pool, &claims.sub)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    Ok((claims, user))
}

fn extract_auth_header(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
}
