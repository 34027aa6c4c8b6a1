use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::models::answer::GradeAnswerRequest;
use crate::models::CreateSessionRequest;
use crate::services::{session_service::SessionService, AppState};

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::bad_request(format!("Validation error: {}", e)))?;

    let service = SessionService::new(
        state.questions.clone(),
        state.sessions.clone(),
        state.locks.clone(),
    );
    let response = service.create(req).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Getting session: {}", session_id);

    let service = SessionService::new(
        state.questions.clone(),
        state.sessions.clone(),
        state.locks.clone(),
    );
    let session = service.get(&session_id).await?;

    Ok(Json(session))
}

pub async fn grade_answer(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<GradeAnswerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::bad_request(format!("Validation error: {}", e)))?;

    tracing::info!("Grading answer for session: {}", session_id);

    let service = SessionService::new(
        state.questions.clone(),
        state.sessions.clone(),
        state.locks.clone(),
    );
    let response = service.grade_answer(&session_id, req).await?;

    Ok(Json(response))
}

pub async fn pause_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Pausing session: {}", session_id);

    let service = SessionService::new(
        state.questions.clone(),
        state.sessions.clone(),
        state.locks.clone(),
    );
    let response = service.pause(&session_id).await?;

    Ok(Json(response))
}

pub async fn resume_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Resuming session: {}", session_id);

    let service = SessionService::new(
        state.questions.clone(),
        state.sessions.clone(),
        state.locks.clone(),
    );
    let response = service.resume(&session_id).await?;

    Ok(Json(response))
}

pub async fn submit_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Submitting session: {}", session_id);

    let service = SessionService::new(
        state.questions.clone(),
        state.sessions.clone(),
        state.locks.clone(),
    );
    let results = service.submit(&session_id).await?;

    Ok(Json(results))
}
