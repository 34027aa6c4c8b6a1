#![allow(dead_code)]

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    // Exam clients are browser apps served from other origins.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        .nest("/api/v1/questions", questions_routes())
        // Trailing-slash prefix so the nested root route registers as
        // `POST /api/v1/sessions/` (axum maps inner `/` to the bare prefix
        // otherwise), per the create-route shape in DESIGN.md.
        .nest("/api/v1/sessions/", sessions_routes())
        .with_state(app_state)
        .layer(cors)
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn questions_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/seed", post(handlers::questions::seed_questions))
        .route("/clear", post(handlers::questions::clear_questions))
}

fn sessions_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/", post(handlers::sessions::create_session))
        .route("/{id}", get(handlers::sessions::get_session))
        .route("/{id}/answers", post(handlers::sessions::grade_answer))
        .route("/{id}/pause", post(handlers::sessions::pause_session))
        .route("/{id}/resume", post(handlers::sessions::resume_session))
        .route("/{id}/submit", post(handlers::sessions::submit_session))
}
