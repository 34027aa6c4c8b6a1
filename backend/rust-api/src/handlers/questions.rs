use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::metrics::QUESTION_BANK_SIZE;
use crate::models::question::{
    ClearQuestionsResponse, SeedQuestionsRequest, SeedQuestionsResponse,
};
use crate::services::AppState;
use crate::storage::QuestionStore;

pub async fn seed_questions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeedQuestionsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::bad_request(format!("Validation error: {}", e)))?;

    tracing::info!("Seeding {} questions", req.questions.len());

    let seeded = state.questions.seed(req.questions).await?;
    let total = state.questions.count().await?;
    QUESTION_BANK_SIZE.set(total as i64);

    Ok((StatusCode::CREATED, Json(SeedQuestionsResponse { seeded })))
}

pub async fn clear_questions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state.questions.clear().await?;
    QUESTION_BANK_SIZE.set(0);

    tracing::info!("Question bank cleared, {} questions removed", removed);

    Ok(Json(ClearQuestionsResponse { removed }))
}
