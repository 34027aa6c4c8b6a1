use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use certlab_api::{config::Config, create_router, services::AppState};

/// In-memory app wired exactly like production, minus external stores.
pub async fn create_test_app() -> Router {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let config = Config::in_memory();
    let app_state = Arc::new(
        AppState::new(config)
            .await
            .expect("Failed to initialize test app state"),
    );

    create_router(app_state)
}

/// Fixed bank: 5 single-select Networking, 3 single-select Security,
/// 2 multi-select Storage. Every single-select marks option `a` correct and
/// every multi-select marks `a` and `b` correct, so grading assertions do
/// not depend on which ids the allocator happened to draw.
pub fn bank_fixture() -> serde_json::Value {
    let mut questions = Vec::new();

    for i in 1..=5 {
        questions.push(json!({
            "id": format!("net-{}", i),
            "type": "single-select",
            "domain": "Networking",
            "stem": format!("Networking question {}", i),
            "options": [
                { "id": "a", "text": "Correct answer", "weight": 1.0 },
                { "id": "b", "text": "Wrong answer", "weight": 0.0 }
            ],
            "explanation": {
                "overview": "Option a is the right call.",
                "option_notes": { "a": "Matches the routing behavior." }
            }
        }));
    }

    for i in 1..=3 {
        questions.push(json!({
            "id": format!("sec-{}", i),
            "type": "single-select",
            "domain": "Security",
            "stem": format!("Security question {}", i),
            "options": [
                { "id": "a", "text": "Correct answer", "weight": 1.0 },
                { "id": "b", "text": "Wrong answer", "weight": 0.0 }
            ],
            "explanation": {
                "overview": "Least privilege wins.",
                "option_notes": {}
            }
        }));
    }

    for i in 1..=2 {
        questions.push(json!({
            "id": format!("sto-{}", i),
            "type": "multi-select",
            "domain": "Storage",
            "stem": format!("Storage question {}", i),
            "options": [
                { "id": "a", "text": "Correct one", "weight": 1.0 },
                { "id": "b", "text": "Correct two", "weight": 1.0 },
                { "id": "c", "text": "Wrong", "weight": 0.0 }
            ],
            "explanation": {
                "overview": "Both replicas count.",
                "option_notes": { "c": "Single-zone storage is not durable." }
            }
        }));
    }

    json!({ "questions": questions })
}

pub async fn seed_bank(app: &Router) {
    let (status, body) = post_json(app, "/api/v1/questions/seed", bank_fixture()).await;
    assert_eq!(status, StatusCode::CREATED, "bank seed failed: {}", body);
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    read_json(response).await
}

pub async fn post_empty(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    read_json(response).await
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

/// Create a session and return its id plus the creation summary.
pub async fn create_session(app: &Router, body: serde_json::Value) -> (String, serde_json::Value) {
    let (status, value) = post_json(app, "/api/v1/sessions/", body).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "session creation failed: {}",
        value
    );
    let session_id = value["session_id"]
        .as_str()
        .expect("session_id missing")
        .to_string();
    (session_id, value["summary"].clone())
}

/// Standard quiz over the fixture bank: Networking 0.6 / Security 0.4,
/// five questions, no timer.
pub fn quiz_session_body() -> serde_json::Value {
    json!({
        "user_id": "learner-1",
        "certification_name": "Cloud Associate",
        "mode": "quiz",
        "domains": ["Networking", "Security"],
        "blueprint": { "Networking": 0.6, "Security": 0.4 },
        "question_count": 5
    })
}

/// Question ids in presentation order, straight from the stored session.
pub async fn session_question_ids(app: &Router, session_id: &str) -> Vec<String> {
    let (status, session) = get_json(app, &format!("/api/v1/sessions/{}", session_id)).await;
    assert_eq!(status, StatusCode::OK, "session fetch failed: {}", session);
    session["questions"]
        .as_array()
        .expect("questions array")
        .iter()
        .map(|q| q["question_id"].as_str().expect("question_id").to_string())
        .collect()
}

/// Submit one answer and return the grading payload.
pub async fn answer(
    app: &Router,
    session_id: &str,
    qid: &str,
    selected: &[&str],
) -> (StatusCode, serde_json::Value) {
    post_json(
        app,
        &format!("/api/v1/sessions/{}/answers", session_id),
        json!({ "qid": qid, "selected": selected }),
    )
    .await
}
