use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_seed_reports_inserted_count() {
    let app = common::create_test_app().await;

    let (status, body) =
        common::post_json(&app, "/api/v1/questions/seed", common::bank_fixture()).await;
    assert_eq!(status, StatusCode::CREATED, "seed failed: {}", body);
    assert_eq!(body["seeded"], 10);
}

#[tokio::test]
async fn test_seed_validation_rejects_out_of_range_weight() {
    let app = common::create_test_app().await;

    let mut fixture = common::bank_fixture();
    fixture["questions"][0]["options"][0]["weight"] = json!(1.5);

    let (status, error) = common::post_json(&app, "/api/v1/questions/seed", fixture).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        error["message"]
            .as_str()
            .unwrap()
            .contains("Validation error"),
        "unexpected message: {}",
        error
    );
}

#[tokio::test]
async fn test_reseeding_overwrites_by_id() {
    let app = common::create_test_app().await;
    common::seed_bank(&app).await;
    common::seed_bank(&app).await;

    // Same ids twice: the bank holds one copy each, so the clear count
    // matches a single fixture load.
    let (status, body) = common::post_empty(&app, "/api/v1/questions/clear").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 10);
}

#[tokio::test]
async fn test_cleared_bank_degrades_allocation_to_empty() {
    let app = common::create_test_app().await;
    common::seed_bank(&app).await;

    let (status, body) = common::post_empty(&app, "/api/v1/questions/clear").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 10);

    // A second clear has nothing left to remove.
    let (_, body) = common::post_empty(&app, "/api/v1/questions/clear").await;
    assert_eq!(body["removed"], 0);

    // Creation still succeeds; every domain just reports a dry pool.
    let (session_id, summary) = common::create_session(&app, common::quiz_session_body()).await;
    let shortfalls = summary["shortfalls"].as_array().unwrap();
    assert_eq!(shortfalls.len(), 2);
    for shortfall in shortfalls {
        assert_eq!(shortfall["drawn"], 0);
    }
    assert!(common::session_question_ids(&app, &session_id)
        .await
        .is_empty());
}

#[tokio::test]
async fn test_draft_questions_never_enter_a_draw() {
    let app = common::create_test_app().await;

    let mut fixture = common::bank_fixture();
    for question in fixture["questions"].as_array_mut().unwrap() {
        if question["domain"] == "Security" {
            question["status"] = json!("draft");
        }
    }
    let (status, _) = common::post_json(&app, "/api/v1/questions/seed", fixture).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, summary) = common::create_session(&app, common::quiz_session_body()).await;
    let shortfalls = summary["shortfalls"].as_array().unwrap();
    assert_eq!(shortfalls.len(), 1);
    assert_eq!(shortfalls[0]["domain"], "Security");
    assert_eq!(shortfalls[0]["drawn"], 0);
}
