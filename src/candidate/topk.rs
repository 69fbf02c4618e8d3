//! Score filtering with a candidate ceiling.

use std::cmp::Ordering;

use crate::candidate::DetectionCandidate;

/// Default upper bound on candidates entering suppression.
pub const DEFAULT_MAX_CANDIDATES: usize = 3000;

fn score_cmp_desc(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Keeps candidates with `score >= score_threshold`, at most `max_candidates`.
///
/// When the ceiling is hit the highest scores survive (earlier slots win
/// ties). Survivors keep their original relative order so that suppression
/// tie-breaking still follows insertion order.
pub(crate) fn filter_candidates(
    candidates: Vec<DetectionCandidate>,
    score_threshold: f32,
    max_candidates: usize,
) -> Vec<DetectionCandidate> {
    let mut kept: Vec<DetectionCandidate> = candidates
        .into_iter()
        .filter(|c| c.score >= score_threshold)
        .collect();
    if kept.len() <= max_candidates {
        return kept;
    }

    let mut ranked: Vec<(usize, f32)> = kept.iter().map(|c| c.score).enumerate().collect();
    ranked.sort_by(score_cmp_desc);
    let mut keep = vec![false; kept.len()];
    for &(idx, _) in ranked.iter().take(max_candidates) {
        keep[idx] = true;
    }
    let mut flags = keep.into_iter();
    kept.retain(|_| flags.next().unwrap_or(false));
    kept
}
