use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    SingleSelect,
    MultiSelect,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleSelect => "single-select",
            QuestionType::MultiSelect => "multi-select",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Published,
    Draft,
}

impl QuestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStatus::Published => "published",
            QuestionStatus::Draft => "draft",
        }
    }
}

fn default_question_status() -> QuestionStatus {
    QuestionStatus::Published
}

/// One selectable option. `weight` encodes how correct the option is:
/// 0 is wrong, 1 is fully correct, anything between is a partial-credit
/// distractor.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionOption {
    #[validate(length(min = 1, message = "Option id must not be empty"))]
    pub id: String,
    pub text: String,
    #[validate(range(min = 0.0, max = 1.0, message = "Option weight must be within [0, 1]"))]
    pub weight: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default)]
    pub overview: String,
    /// Option id -> note shown next to that option during review.
    #[serde(default)]
    pub option_notes: HashMap<String, String>,
}

/// Immutable question bank entry. Seeded in bulk, never mutated afterwards,
/// removed only by a full-bank clear.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Question {
    #[validate(length(min = 1, message = "Question id must not be empty"))]
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[validate(length(min = 1, message = "Domain must not be empty"))]
    pub domain: String,
    #[validate(length(min = 1, message = "Stem must not be empty"))]
    pub stem: String,
    #[validate(length(min = 2, message = "A question needs at least two options"))]
    #[validate(nested)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub explanation: Explanation,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub suggested_seconds: Option<u32>,
    #[serde(default = "default_question_status")]
    pub status: QuestionStatus,
}

impl Question {
    pub fn find_option(&self, option_id: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|opt| opt.id == option_id)
    }

    /// Option id -> weight map, exposed to clients during post-submit review.
    pub fn option_weights(&self) -> HashMap<String, f64> {
        self.options
            .iter()
            .map(|opt| (opt.id.clone(), opt.weight))
            .collect()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SeedQuestionsRequest {
    #[validate(length(min = 1, message = "At least one question is required"))]
    #[validate(nested)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct SeedQuestionsResponse {
    pub seeded: u64,
}

#[derive(Debug, Serialize)]
pub struct ClearQuestionsResponse {
    pub removed: u64,
}
