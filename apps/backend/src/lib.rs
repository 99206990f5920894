pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::Database;
use quiz_core::Scheduler;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub scheduler: Arc<Scheduler>,
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Connect to database
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let state = AppState {
        db: Arc::new(db),
        scheduler: Arc::new(Scheduler::default()),
    };

    // Build router with protected routes
    let protected_routes = Router::new()
        // User routes
        .route("/api/users/status", get(routes::users::status))
        // Category routes
        .route("/api/categories", get(routes::categories::list))
        // Test routes
        .route(
            "/api/tests",
            post(routes::tests::start).get(routes::tests::list),
        )
        .route("/api/tests/:id", get(routes::tests::get))
        .route("/api/tests/:id/submit", post(routes::tests::submit))
        .route("/api/tests/:id/results", get(routes::tests::results))
        // Timer routes
        .route("/api/timers", post(routes::timers::start))
        .route("/api/timers/:id/stop", post(routes::timers::stop))
        // Study session routes
        .route(
            "/api/study-sessions",
            post(routes::study_sessions::create).get(routes::study_sessions::list),
        )
        // Dashboard routes
        .route("/api/dashboard/summary", get(routes::dashboard::summary))
        .route(
            "/api/dashboard/categories",
            get(routes::dashboard::categories),
        )
        .route("/api/dashboard/daily", get(routes::dashboard::daily))
        .route(
            "/api/dashboard/weak-areas",
            get(routes::dashboard::weak_areas),
        )
        .route(
            "/api/dashboard/challenging",
            get(routes::dashboard::challenging),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    // Build full router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/users/register", post(routes::users::register))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
