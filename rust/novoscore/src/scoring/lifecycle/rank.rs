use crate::models::Candidate;
use crate::scoring::context::ScoringContext;
use std::cmp::Ordering;

/// Best first: composite, then probability, then intensity.
///
/// Sorting is stable, so remaining ties keep input order.
fn rank_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.scores
        .composite
        .total_cmp(&a.scores.composite)
        .then(b.scores.probability.total_cmp(&a.scores.probability))
        .then(b.scores.intensity.total_cmp(&a.scores.intensity))
}

/// Sorts, assigns ranks 1..N and cuts the list down to what is reported.
pub fn rank_candidates(ctx: &ScoringContext, candidates: &mut Vec<Candidate>) {
    candidates.sort_by(rank_order);
    for (i, cand) in candidates.iter_mut().enumerate() {
        cand.scores.rank = i + 1;
    }
    candidates.retain(|c| c.scores.composite >= ctx.output_threshold);
    candidates.truncate(ctx.output_count);
}
