use serde::{Deserialize, Serialize};
use validator::Validate;

use super::question::Explanation;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GradeAnswerRequest {
    #[validate(length(min = 1, message = "qid must not be empty"))]
    pub qid: String,
    /// Selected option ids; empty means the learner cleared the item.
    #[serde(default)]
    pub selected: Vec<String>,
}

/// Per-item feedback. The selection is partitioned by option weight; the
/// question's explanation rides along verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub correct: Vec<String>,
    pub incorrect: Vec<String>,
    pub explanation: Explanation,
}

#[derive(Debug, Serialize)]
pub struct GradeAnswerResponse {
    pub per_item_score: f64,
    pub feedback_allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}
