use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::models::question::Question;
use crate::models::{AllocationShortfall, DomainAllocation};

/// Output of one allocation run: the per-domain plan, the drawn questions in
/// final (mixed) order, and any domains whose pool could not cover its count.
pub struct AllocationOutcome {
    pub allocations: Vec<DomainAllocation>,
    pub questions: Vec<Question>,
    pub shortfalls: Vec<AllocationShortfall>,
}

/// Apportion `question_count` across the selected domains with the
/// largest-remainder method.
///
/// The blueprint is first restricted to the selected domains (caller order,
/// duplicates collapsed); selected domains missing from the blueprint are
/// dropped. Restricted weights are renormalized to sum to 1, each domain gets
/// `floor(weight * question_count)`, and the leftover units go to the largest
/// fractional parts. The stable sort keeps caller order on tied fractions, so
/// the result is deterministic. Counts always sum to exactly
/// `question_count`.
pub fn plan(
    blueprint: &HashMap<String, f64>,
    selected_domains: &[String],
    question_count: usize,
) -> Result<Vec<DomainAllocation>, ApiError> {
    let mut domains: Vec<&String> = Vec::new();
    for domain in selected_domains {
        if !domains.contains(&domain) {
            domains.push(domain);
        }
    }

    let mut weighted: Vec<(String, f64)> = Vec::new();
    for domain in domains {
        if let Some(&weight) = blueprint.get(domain) {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ApiError::bad_request(format!(
                    "Blueprint weight for domain '{}' must be a finite non-negative number",
                    domain
                )));
            }
            weighted.push((domain.clone(), weight));
        }
    }

    let total: f64 = weighted.iter().map(|(_, weight)| weight).sum();
    if weighted.is_empty() || total <= 0.0 {
        return Err(ApiError::bad_request(
            "Selected domains carry no blueprint weight",
        ));
    }

    let mut allocations: Vec<DomainAllocation> = Vec::with_capacity(weighted.len());
    let mut fractions: Vec<f64> = Vec::with_capacity(weighted.len());
    let mut assigned = 0usize;

    for (domain, weight) in weighted {
        let normalized = weight / total;
        let exact = normalized * question_count as f64;
        let base = exact.floor() as usize;
        assigned += base;
        fractions.push(exact - base as f64);
        allocations.push(DomainAllocation {
            domain,
            count: base,
            weight: normalized,
        });
    }

    let mut by_fraction: Vec<usize> = (0..allocations.len()).collect();
    by_fraction.sort_by(|&a, &b| fractions[b].total_cmp(&fractions[a]));

    let remainder = question_count.saturating_sub(assigned);
    for &idx in by_fraction.iter().take(remainder) {
        allocations[idx].count += 1;
    }

    Ok(allocations)
}

/// Plan the per-domain counts, then draw that many questions from each pool
/// uniformly without replacement (shuffle-and-slice) and shuffle the combined
/// draw so the final order mixes domains.
///
/// A pool smaller than its count degrades to fewer questions and is reported
/// in `shortfalls`; the draw itself never fails for that reason.
pub fn allocate<R: Rng + ?Sized>(
    blueprint: &HashMap<String, f64>,
    selected_domains: &[String],
    question_count: usize,
    mut pools: HashMap<String, Vec<Question>>,
    rng: &mut R,
) -> Result<AllocationOutcome, ApiError> {
    let allocations = plan(blueprint, selected_domains, question_count)?;

    let mut questions: Vec<Question> = Vec::with_capacity(question_count);
    let mut shortfalls: Vec<AllocationShortfall> = Vec::new();

    for allocation in &allocations {
        if allocation.count == 0 {
            continue;
        }

        let mut pool = pools.remove(&allocation.domain).unwrap_or_default();
        pool.shuffle(rng);

        if pool.len() < allocation.count {
            shortfalls.push(AllocationShortfall {
                domain: allocation.domain.clone(),
                requested: allocation.count,
                drawn: pool.len(),
            });
        }
        pool.truncate(allocation.count);
        questions.extend(pool);
    }

    questions.shuffle(rng);

    Ok(AllocationOutcome {
        allocations,
        questions,
        shortfalls,
    })
}
