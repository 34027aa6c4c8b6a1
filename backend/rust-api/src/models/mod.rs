use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

pub mod answer;
pub mod question;
pub mod reporting;

use answer::Feedback;
use question::QuestionType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Feedback is shown immediately after every graded item.
    Quiz,
    /// Feedback is withheld until submission unless review config opts in.
    Exam,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Quiz => "quiz",
            SessionMode::Exam => "exam",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Paused,
    Submitted,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Submitted => "submitted",
        }
    }
}

/// Wall-clock timer descriptor. `ends_at` is authoritative while the session
/// is active; `remaining_sec` is captured on pause and turned back into a
/// fresh `ends_at` on resume, so paused time never counts against the
/// learner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerState {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub duration_min: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_sec: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default)]
    pub explanations_while_taking: bool,
}

/// One slot of the fixed exam order: enough to render a question list and
/// group results without refetching the bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionQuestion {
    pub question_id: String,
    pub domain: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedAnswer {
    pub selected: Vec<String>,
    pub score: f64,
    /// Populated only when the visibility policy allowed feedback at grading
    /// time; kept empty otherwise so stored sessions never leak explanations
    /// to exam-mode clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

/// One learner attempt. The question list is fixed at creation and never
/// re-shuffled; only `answers`, `status` and `timer` mutate afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub certification_name: String,
    pub mode: SessionMode,
    pub domains: Vec<String>,
    pub blueprint: HashMap<String, f64>,
    pub question_count: usize,
    pub timer: TimerState,
    #[serde(default)]
    pub review: ReviewConfig,
    pub status: SessionStatus,
    /// Pagination cursor kept for wire compatibility with older clients;
    /// the engine never reads it.
    #[serde(default)]
    pub current_index: usize,
    pub questions: Vec<SessionQuestion>,
    #[serde(default)]
    pub answers: HashMap<String, RecordedAnswer>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_submitted(&self) -> bool {
        self.status == SessionStatus::Submitted
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TimerRequest {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub duration_min: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "certification_name must not be empty"))]
    pub certification_name: String,
    pub mode: SessionMode,
    #[validate(length(min = 1, message = "At least one domain must be selected"))]
    pub domains: Vec<String>,
    pub blueprint: HashMap<String, f64>,
    pub question_count: usize,
    #[serde(default)]
    pub timer: TimerRequest,
    #[serde(default)]
    pub review: ReviewConfig,
}

/// Ephemeral per-domain allocation result; returned in the creation summary,
/// never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DomainAllocation {
    pub domain: String,
    pub count: usize,
    pub weight: f64,
}

/// Emitted when a domain's pool could not cover its allocated count.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AllocationShortfall {
    pub domain: String,
    pub requested: usize,
    pub drawn: usize,
}

#[derive(Debug, Serialize)]
pub struct AllocationSummary {
    pub allocations: Vec<DomainAllocation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shortfalls: Vec<AllocationShortfall>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub summary: AllocationSummary,
}

#[derive(Debug, Serialize)]
pub struct PauseSessionResponse {
    pub remaining_sec: i64,
}

#[derive(Debug, Serialize)]
pub struct ResumeSessionResponse {
    pub ends_at: DateTime<Utc>,
}
