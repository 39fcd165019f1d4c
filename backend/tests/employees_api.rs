use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use serde_json::json;
use sqlx::PgPool;
use staffhub_backend::{handlers::employees, middleware, models::user::UserRole};
use tower::ServiceExt;
use uuid::Uuid;

mod support;

use support::{create_test_token, seed_employee, seed_user, test_config, test_pool};

async fn integration_guard() -> tokio::sync::MutexGuard<'static, ()> {
    static GUARD: std::sync::OnceLock<tokio::sync::Mutex<()>> = std::sync::OnceLock::new();
    GUARD
        .get_or_init(|| tokio::sync::Mutex::new(()))
        .lock()
        .await
}

/// The roster surface, HR-gated exactly as in the real app.
fn roster_router(pool: PgPool) -> Router {
    let config = test_config();
    Router::new()
        .route(
            "/api/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route("/api/employees/stats", get(employees::get_employee_stats))
        .route(
            "/api/employees/{id}",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            (pool.clone(), config.clone()),
            middleware::auth_hr,
        ))
        .with_state((pool, config))
}

fn authed_request(
    method: &str,
    uri: &str,
    token: &str,
    payload: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token));
    match payload {
        Some(payload) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&body).expect("parse json")
}

#[tokio::test]
async fn hr_manages_the_roster_end_to_end() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let hr_head = seed_user(&pool, UserRole::HrHead).await;
    let config = test_config();
    let token = create_test_token(&hr_head, &config);
    let app = roster_router(pool.clone());

    let email = format!("marisol_{}@example.com", Uuid::new_v4());
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/employees",
            &token,
            Some(json!({
                "full_name": "Marisol Vega",
                "email": email,
                "department": "Finance",
                "title": "Accountant"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = read_json(response).await;
    assert_eq!(created["full_name"], "Marisol Vega");
    // Status defaults to active when the payload leaves it out.
    assert_eq!(created["status"], "active");
    let id = created["id"].as_str().expect("employee id").to_string();
    let uri = format!("/api/employees/{}", id);

    let response = app
        .clone()
        .oneshot(authed_request("GET", &uri, &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = read_json(response).await;
    assert_eq!(fetched["email"], email.as_str());

    let response = app
        .clone()
        .oneshot(authed_request(
            "PUT",
            &uri,
            &token,
            Some(json!({"title": "Senior Accountant", "status": "absent"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["title"], "Senior Accountant");
    assert_eq!(updated["status"], "absent");
    // Untouched fields ride through a partial update.
    assert_eq!(updated["full_name"], "Marisol Vega");
    assert_eq!(updated["department"], "Finance");

    let response = app
        .clone()
        .oneshot(authed_request("DELETE", &uri, &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["message"], "Employee deleted");

    let response = app
        .oneshot(authed_request("GET", &uri, &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn roster_routes_require_the_hr_role() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let employee = seed_user(&pool, UserRole::Employee).await;
    let dept_head = seed_user(&pool, UserRole::DepartmentHead).await;
    let config = test_config();
    let app = roster_router(pool.clone());

    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            "/api/employees",
            &create_test_token(&employee, &config),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Department heads review leave, not personnel records.
    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/employees",
            &create_test_token(&dept_head, &config),
            Some(json!({
                "full_name": "Nobody Allowed",
                "email": "nobody@example.com",
                "department": "Shadow",
                "title": "Ghost"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let hr_head = seed_user(&pool, UserRole::HrHead).await;
    let existing = seed_employee(&pool).await;
    let config = test_config();
    let token = create_test_token(&hr_head, &config);
    let app = roster_router(pool.clone());

    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/employees",
            &token,
            Some(json!({
                "full_name": "Copy Cat",
                "email": existing.email,
                "department": "Engineering",
                "title": "Engineer"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], "CONFLICT");
    assert_eq!(payload["error"], "Email already exists");
}

#[tokio::test]
async fn update_rejects_a_colliding_email() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let hr_head = seed_user(&pool, UserRole::HrHead).await;
    let first = seed_employee(&pool).await;
    let second = seed_employee(&pool).await;
    let config = test_config();
    let token = create_test_token(&hr_head, &config);
    let app = roster_router(pool.clone());
    let uri = format!("/api/employees/{}", second.id);

    let response = app
        .clone()
        .oneshot(authed_request(
            "PUT",
            &uri,
            &token,
            Some(json!({"email": first.email})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Re-submitting the record's own address is not a collision.
    let response = app
        .oneshot(authed_request(
            "PUT",
            &uri,
            &token,
            Some(json!({"email": second.email})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_filters_narrow_the_roster() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let hr_head = seed_user(&pool, UserRole::HrHead).await;
    let config = test_config();
    let token = create_test_token(&hr_head, &config);
    let app = roster_router(pool.clone());

    // Unique values keep the assertions exact without wiping the table.
    let department = format!("Quality-{}", Uuid::new_v4());
    let needle = Uuid::new_v4().simple().to_string();

    let create = |name: String, dept: String, status: &'static str| {
        let app = app.clone();
        let token = token.clone();
        async move {
            let response = app
                .oneshot(authed_request(
                    "POST",
                    "/api/employees",
                    &token,
                    Some(json!({
                        "full_name": name,
                        "email": format!("roster_{}@example.com", Uuid::new_v4()),
                        "department": dept,
                        "title": "Specialist",
                        "status": status
                    })),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            read_json(response).await["id"]
                .as_str()
                .expect("employee id")
                .to_string()
        }
    };

    let active_id = create("Dana Active".into(), department.clone(), "active").await;
    let absent_id = create("Goran Absent".into(), department.clone(), "absent").await;
    let searched_id = create(
        format!("Searchable {}", needle),
        "Facilities".into(),
        "active",
    )
    .await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            &format!("/api/employees?department={}", department),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = read_json(response).await;
    assert_eq!(page["total"], 2);
    // Alphabetical by name.
    assert_eq!(page["data"][0]["id"], active_id.as_str());
    assert_eq!(page["data"][1]["id"], absent_id.as_str());

    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            &format!("/api/employees?department={}&status=absent", department),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = read_json(response).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["id"], absent_id.as_str());

    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            &format!("/api/employees?search={}", needle),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = read_json(response).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["id"], searched_id.as_str());

    let response = app
        .oneshot(authed_request(
            "GET",
            "/api/employees?status=retired",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_track_employment_status() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    // Users reference employees, so the wipe has to cascade.
    sqlx::query("TRUNCATE employees CASCADE")
        .execute(&pool)
        .await
        .expect("truncate employees");

    let hr_head = seed_user(&pool, UserRole::HrHead).await;
    let config = test_config();
    let app = roster_router(pool.clone());

    for status in ["active", "absent", "terminated"] {
        let employee = seed_employee(&pool).await;
        sqlx::query("UPDATE employees SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(&employee.id)
            .execute(&pool)
            .await
            .expect("set status");
    }

    let response = app
        .oneshot(authed_request(
            "GET",
            "/api/employees/stats",
            &create_test_token(&hr_head, &config),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats = read_json(response).await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["active"], 1);
    assert_eq!(stats["absent"], 1);
    assert_eq!(stats["terminated"], 1);
}

#[tokio::test]
async fn missing_employee_returns_not_found() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let hr_head = seed_user(&pool, UserRole::HrHead).await;
    let config = test_config();
    let token = create_test_token(&hr_head, &config);
    let app = roster_router(pool.clone());
    let uri = "/api/employees/no-such-employee";

    let response = app
        .clone()
        .oneshot(authed_request("GET", uri, &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(authed_request(
            "PUT",
            uri,
            &token,
            Some(json!({"title": "Phantom"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(authed_request("DELETE", uri, &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_validates_the_payload() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let hr_head = seed_user(&pool, UserRole::HrHead).await;
    let config = test_config();
    let token = create_test_token(&hr_head, &config);
    let app = roster_router(pool.clone());

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/employees",
            &token,
            Some(json!({
                "full_name": "Valid Name",
                "email": "not-an-address",
                "department": "Finance",
                "title": "Accountant"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], "VALIDATION_ERROR");
    let details = payload["details"]["errors"].as_array().expect("error details");
    assert!(details
        .iter()
        .any(|d| d.as_str().unwrap_or_default().contains("email")));

    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/employees",
            &token,
            Some(json!({
                "full_name": "Valid Name",
                "email": "valid@example.com",
                "department": "",
                "title": "Accountant"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_an_employee_detaches_linked_accounts() {
    let _guard = integration_guard().await;
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let hr_head = seed_user(&pool, UserRole::HrHead).await;
    let account = seed_user(&pool, UserRole::Employee).await;
    let employee = seed_employee(&pool).await;
    sqlx::query("UPDATE users SET employee_id = $1 WHERE id = $2")
        .bind(&employee.id)
        .bind(&account.id)
        .execute(&pool)
        .await
        .expect("link account");

    let config = test_config();
    let app = roster_router(pool.clone());

    let response = app
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/employees/{}", employee.id),
            &create_test_token(&hr_head, &config),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The account survives with its personnel link cleared.
    let linked: Option<String> =
        sqlx::query_scalar("SELECT employee_id FROM users WHERE id = $1")
            .bind(&account.id)
            .fetch_one(&pool)
            .await
            .expect("fetch account");
    assert!(linked.is_none());
}
