//! Score aggregation. All aggregates only consider finalized score rows;
//! callers filter before handing data in.

use crate::entity::score::Criterion;

/// Sum a score sheet into (total, max_total).
pub fn compute_totals(criteria: &[Criterion]) -> (f64, f64) {
    let total = criteria.iter().map(|c| c.score).sum();
    let max = criteria.iter().map(|c| c.max_score).sum();
    (total, max)
}

/// Overall percentage across every finalized score a team has received, in
/// any round: `100 * sum(total) / sum(max_total)`. Zero when there are no
/// scores or no attainable points.
pub fn overall_score(totals: &[(f64, f64)]) -> f64 {
    let sum: f64 = totals.iter().map(|(t, _)| t).sum();
    let max: f64 = totals.iter().map(|(_, m)| m).sum();
    if max == 0.0 { 0.0 } else { 100.0 * sum / max }
}

/// Per-round score: the plain mean of finalized total scores for that round.
/// Note this is a raw average, not a percentage like [`overall_score`].
pub fn round_score(totals: &[f64]) -> f64 {
    if totals.is_empty() {
        0.0
    } else {
        totals.iter().sum::<f64>() / totals.len() as f64
    }
}

/// Positional 1-based ranking over scores already sorted descending. Tied
/// scores do not share a rank; each entry takes its list position, so ties
/// get distinct consecutive ranks in their original relative order.
pub fn assign_ranks(sorted_scores: &[f64]) -> Vec<u32> {
    (1..=sorted_scores.len() as u32).collect()
}
