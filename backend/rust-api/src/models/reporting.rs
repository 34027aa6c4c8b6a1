use serde::Serialize;
use std::collections::HashMap;

use super::question::Explanation;

/// Domain-level slice of the final result. `weight` is the blueprint weight
/// as supplied by the caller, deliberately not renormalized over the
/// answered subset (see the aggregation notes in the scoring service).
#[derive(Debug, Clone, Serialize)]
pub struct DomainScore {
    pub domain: String,
    pub weight: f64,
    pub count: usize,
    pub mean: f64,
    pub contribution: f64,
}

/// One reviewable item in the submit response. Unanswered questions keep
/// their slot with an empty selection and a null score.
#[derive(Debug, Clone, Serialize)]
pub struct ItemReview {
    pub qid: String,
    pub your_selection: Vec<String>,
    pub per_item_score: Option<f64>,
    pub weights: HashMap<String, f64>,
    pub explanation: Explanation,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResults {
    pub overall_score_pct: i32,
    pub per_domain: Vec<DomainScore>,
    pub items: Vec<ItemReview>,
}
