use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use staffhub_backend::{
    config::Config, db::connection::create_pool, docs::ApiDoc, handlers,
    middleware as auth_middleware,
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "staffhub_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        jwt_secret = %mask_secret(&config.jwt_secret),
        jwt_expiration_hours = config.jwt_expiration_hours,
        refresh_token_expiration_days = config.refresh_token_expiration_days,
        time_zone = %config.time_zone,
        approval_chain = %config.approval_chain,
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Build public routes (no auth)
    let public_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh));

    // Build user routes (auth required, any role)
    let user_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/leave-requests",
            post(handlers::leave_requests::submit_request),
        )
        .route(
            "/api/leave-requests/me",
            get(handlers::leave_requests::get_my_requests),
        )
        .route(
            "/api/leave-requests/{id}",
            get(handlers::leave_requests::get_request_detail),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            (pool.clone(), config.clone()),
            auth_middleware::auth,
        ));

    // Build reviewer routes (auth + reviewer role)
    let reviewer_routes = Router::new()
        .route(
            "/api/leave-requests/inbox",
            get(handlers::leave_requests::get_inbox),
        )
        .route(
            "/api/leave-requests/{id}/advance",
            put(handlers::leave_requests::advance_request),
        )
        .route(
            "/api/leave-requests/{id}/reject",
            put(handlers::leave_requests::reject_request),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            (pool.clone(), config.clone()),
            auth_middleware::auth_reviewer,
        ));

    // Build HR routes (auth + hr_head role)
    let hr_routes = Router::new()
        .route(
            "/api/leave-requests",
            get(handlers::leave_requests::list_requests),
        )
        .route(
            "/api/leave-requests/stats",
            get(handlers::leave_requests::get_request_stats),
        )
        .route(
            "/api/leave-requests/{id}",
            delete(handlers::leave_requests::delete_request),
        )
        .route(
            "/api/employees",
            get(handlers::employees::list_employees).post(handlers::employees::create_employee),
        )
        .route(
            "/api/employees/stats",
            get(handlers::employees::get_employee_stats),
        )
        .route(
            "/api/employees/{id}",
            get(handlers::employees::get_employee)
                .put(handlers::employees::update_employee)
                .delete(handlers::employees::delete_employee),
        )
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/users/{id}",
            put(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            (pool.clone(), config.clone()),
            auth_middleware::auth_hr,
        ));

    // Compose app with shared layers (CORS/Trace) and shared state
    let app = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(reviewer_routes)
        .merge(hr_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .with_state((pool, config));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
