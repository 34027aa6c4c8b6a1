use std::collections::HashMap;

use crate::models::question::Question;
use crate::models::reporting::{DomainScore, ItemReview, SessionResults};
use crate::models::{RecordedAnswer, SessionQuestion};

/// Aggregate a finished session into its final results.
///
/// Only answered questions count: a skipped question is excluded from its
/// domain's mean, not scored as zero. Domain contributions use the blueprint
/// weight as the caller supplied it, with no renormalization over the
/// answered subset. Domains the learner never answered in simply drop out of
/// the sum, so a perfect score on the answered items can still land below
/// 100 when the answered domains' weights do not cover the full blueprint.
/// That asymmetry is part of the scoring contract, not an accident.
pub fn finalize(
    questions: &[SessionQuestion],
    bank: &HashMap<String, Question>,
    answers: &HashMap<String, RecordedAnswer>,
    blueprint: &HashMap<String, f64>,
) -> SessionResults {
    // Domains in first-appearance session order, answered or not; only
    // answered ones make it into per_domain.
    let mut domain_order: Vec<&str> = Vec::new();
    let mut scores_by_domain: HashMap<&str, Vec<f64>> = HashMap::new();

    for session_question in questions {
        let domain = session_question.domain.as_str();
        if !domain_order.contains(&domain) {
            domain_order.push(domain);
        }
        if let Some(answer) = answers.get(&session_question.question_id) {
            scores_by_domain.entry(domain).or_default().push(answer.score);
        }
    }

    let mut per_domain: Vec<DomainScore> = Vec::new();
    let mut overall = 0.0;

    for domain in domain_order {
        let Some(scores) = scores_by_domain.get(domain) else {
            continue;
        };
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let weight = blueprint.get(domain).copied().unwrap_or(0.0);
        let contribution = mean * weight;
        overall += contribution;

        per_domain.push(DomainScore {
            domain: domain.to_string(),
            weight,
            count: scores.len(),
            mean,
            contribution,
        });
    }

    let items = questions
        .iter()
        .map(|session_question| {
            let answer = answers.get(&session_question.question_id);
            let (weights, explanation) = match bank.get(&session_question.question_id) {
                Some(question) => (question.option_weights(), question.explanation.clone()),
                None => (HashMap::new(), Default::default()),
            };

            ItemReview {
                qid: session_question.question_id.clone(),
                your_selection: answer.map(|a| a.selected.clone()).unwrap_or_default(),
                per_item_score: answer.map(|a| a.score),
                weights,
                explanation,
            }
        })
        .collect();

    SessionResults {
        overall_score_pct: (overall * 100.0).round() as i32,
        per_domain,
        items,
    }
}
