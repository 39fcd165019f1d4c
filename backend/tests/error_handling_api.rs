use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use serde_json::json;
use sqlx::PgPool;
use staffhub_backend::{handlers::leave_requests, middleware, models::user::UserRole};
use tower::ServiceExt;

mod support;

use support::{create_test_token, seed_user, test_config, test_pool};

async fn integration_guard() -> tokio::sync::MutexGuard<'static, ()> {
    static GUARD: std::sync::OnceLock<tokio::sync::Mutex<()>> = std::sync::OnceLock::new();
    GUARD
        .get_or_init(|| tokio::sync::Mutex::new(()))
        .lock()
        .await
}

fn submit_router(pool: PgPool) -> Router {
    let config = test_config();
    Router::new()
        .route("/api/leave-requests", post(leave_requests::submit_request))
        .route("/api/leave-requests/me", get(leave_requests::get_my_requests))
        .route_layer(axum_middleware::from_fn_with_state(
            (pool.clone(), config.clone()),
            middleware::auth,
        ))
        .with_state((pool, config))
}

fn hr_list_router(pool: PgPool) -> Router {
    let config = test_config();
    Router::new()
        .route("/api/leave-requests", get(leave_requests::list_requests))
        .route_layer(axum_middleware::from_fn_with_state(
            (pool.clone(), config.clone()),
            middleware::auth_hr,
        ))
        .with_state((pool, config))
}

#[tokio::test]
async fn invalid_json_payload_returns_bad_request() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let employee = seed_user(&pool, UserRole::Employee).await;
    let token = create_test_token(&employee, &test_config());
    let app = submit_router(pool.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/leave-requests")
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from("not valid json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_required_field_returns_unprocessable_entity() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let employee = seed_user(&pool, UserRole::Employee).await;
    let token = create_test_token(&employee, &test_config());
    let app = submit_router(pool.clone());

    // Well-formed JSON that does not fit the payload shape.
    let payload = json!({
        "category": "vacation"
    });
    let request = Request::builder()
        .method("POST")
        .uri("/api/leave-requests")
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_category_in_body_returns_unprocessable_entity() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let employee = seed_user(&pool, UserRole::Employee).await;
    let token = create_test_token(&employee, &test_config());
    let app = submit_router(pool.clone());

    let payload = json!({
        "category": "sabbatical",
        "reason": "A year off",
        "start_date": "2025-06-01",
        "end_date": "2026-06-01"
    });
    let request = Request::builder()
        .method("POST")
        .uri("/api/leave-requests")
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn out_of_range_pagination_is_clamped() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let hr_head = seed_user(&pool, UserRole::HrHead).await;
    let token = create_test_token(&hr_head, &test_config());
    let app = hr_list_router(pool.clone());

    let request = Request::builder()
        .uri("/api/leave-requests?limit=100000&offset=-5")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let page: serde_json::Value = serde_json::from_slice(&body).expect("parse json");
    assert_eq!(page["limit"], 500);
    assert_eq!(page["offset"], 0);
}

#[tokio::test]
async fn malformed_date_in_query_returns_bad_request() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let hr_head = seed_user(&pool, UserRole::HrHead).await;
    let token = create_test_token(&hr_head, &test_config());
    let app = hr_list_router(pool.clone());

    let request = Request::builder()
        .uri("/api/leave-requests?from=invalid-date")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_bearer_token_returns_unauthorized() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let app = submit_router(pool.clone());

    let request = Request::builder()
        .uri("/api/leave-requests/me")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_jwt_returns_unauthorized() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let app = submit_router(pool.clone());

    let request = Request::builder()
        .uri("/api/leave-requests/me")
        .header("Authorization", "Bearer invalid-token")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_jwt_returns_unauthorized() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let employee = seed_user(&pool, UserRole::Employee).await;

    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use staffhub_backend::utils::jwt::Claims;

    let past_time = Utc::now() - Duration::hours(2);
    let claims = Claims {
        sub: employee.id.clone(),
        email: employee.email.clone(),
        role: "employee".to_string(),
        exp: past_time.timestamp(),
        iat: (past_time - Duration::hours(1)).timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
    };
    let expired_token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(test_config().jwt_secret.as_ref()),
    )
    .expect("encode expired token");

    let app = submit_router(pool.clone());
    let request = Request::builder()
        .uri("/api/leave-requests/me")
        .header("Authorization", format!("Bearer {}", expired_token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_a_deleted_account_returns_unauthorized() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let employee = seed_user(&pool, UserRole::Employee).await;
    let token = create_test_token(&employee, &test_config());
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(&employee.id)
        .execute(&pool)
        .await
        .expect("delete user");

    let app = submit_router(pool.clone());
    let request = Request::builder()
        .uri("/api/leave-requests/me")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    // The signature is fine but the account behind it is gone.
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
