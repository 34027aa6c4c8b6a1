use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;
use std::sync::Arc;

use crate::metrics;
use crate::services::AppState;
use crate::storage::{QuestionStore, SessionStore};

pub mod questions;
pub mod sessions;

/// Storage-aware health report: both stores are pinged through their traits,
/// so the same handler covers the memory and mongo-redis deployments.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let question_health = check_store(state.questions.ping()).await;
    let session_health = check_store(state.sessions.ping()).await;

    let all_healthy = [&question_health, &session_health]
        .iter()
        .all(|dep| dep.get("status").and_then(|v| v.as_str()) == Some("healthy"));

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(json!({
            "status": if all_healthy { "healthy" } else { "degraded" },
            "service": "certlab-api",
            "version": env!("CARGO_PKG_VERSION"),
            "backend": state.config.storage_backend.as_str(),
            "dependencies": {
                "question_store": question_health,
                "session_store": session_health,
            }
        })),
    )
}

async fn check_store<F>(ping: F) -> serde_json::Value
where
    F: std::future::Future<Output = anyhow::Result<()>>,
{
    match tokio::time::timeout(std::time::Duration::from_secs(1), ping).await {
        Ok(Ok(())) => json!({ "status": "healthy" }),
        Ok(Err(e)) => json!({ "status": "unhealthy", "error": format!("{}", e) }),
        Err(_) => json!({ "status": "unhealthy", "error": "Ping timeout after 1s" }),
    }
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

/// HTTP Basic Auth guard for /metrics. Operational credential, not user
/// auth; configured via METRICS_AUTH as `username:password`.
pub async fn metrics_auth_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .map(credentials_match)
        .unwrap_or(false);

    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

fn credentials_match(encoded: &str) -> bool {
    let Ok(decoded) = general_purpose::STANDARD.decode(encoded) else {
        return false;
    };
    let Ok(credentials) = String::from_utf8(decoded) else {
        return false;
    };

    let expected = std::env::var("METRICS_AUTH").unwrap_or_else(|_| "admin:changeme".to_string());
    credentials == expected
}
