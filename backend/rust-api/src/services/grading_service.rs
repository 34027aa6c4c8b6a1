use crate::models::answer::Feedback;
use crate::models::question::{Question, QuestionType};
use crate::models::{ReviewConfig, SessionMode};

/// Policy switch for showing feedback while a session is still running.
/// Quiz mode always shows it; exam mode only when the session was created
/// with `explanations_while_taking`.
pub fn feedback_visible(mode: SessionMode, review: &ReviewConfig) -> bool {
    mode == SessionMode::Quiz || review.explanations_while_taking
}

/// Score one response and build its feedback.
///
/// The selection is deduplicated first; submitting the same id twice must
/// not change the score or inflate coverage. Feedback splits the selection
/// into `correct` (matched an option with weight > 0) and `incorrect`
/// (weight 0, or no such option) and carries the question's explanation
/// verbatim. Whether the caller may SEE the feedback is a separate concern
/// (`feedback_visible`); grading always computes it.
pub fn grade(question: &Question, selected: &[String]) -> (f64, Feedback) {
    let mut unique: Vec<&String> = Vec::with_capacity(selected.len());
    for id in selected {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }

    let mut correct: Vec<String> = Vec::new();
    let mut incorrect: Vec<String> = Vec::new();
    for &id in &unique {
        match question.find_option(id) {
            Some(option) if option.weight > 0.0 => correct.push(id.clone()),
            _ => incorrect.push(id.clone()),
        }
    }

    let score = match question.question_type {
        QuestionType::SingleSelect => single_select_score(question, &unique),
        QuestionType::MultiSelect => multi_select_score(question, &unique),
    };

    let feedback = Feedback {
        correct,
        incorrect,
        explanation: question.explanation.clone(),
    };

    (score, feedback)
}

fn single_select_score(question: &Question, selected: &[&String]) -> f64 {
    selected
        .first()
        .and_then(|id| question.find_option(id))
        .map(|option| option.weight)
        .unwrap_or(0.0)
}

fn multi_select_score(question: &Question, selected: &[&String]) -> f64 {
    if selected.is_empty() {
        return 0.0;
    }

    let weights: Vec<f64> = selected
        .iter()
        .map(|id| question.find_option(id).map(|o| o.weight).unwrap_or(0.0))
        .collect();
    let avg = weights.iter().sum::<f64>() / weights.len() as f64;

    let positive_options = question.options.iter().filter(|o| o.weight > 0.0).count();
    let selected_positive = weights.iter().filter(|&&w| w > 0.0).count();

    let denominator = positive_options.min(selected.len());
    if denominator == 0 {
        // Every selectable weight is 0, so avg is 0 as well.
        return 0.0;
    }

    avg * (selected_positive as f64 / denominator as f64)
}
