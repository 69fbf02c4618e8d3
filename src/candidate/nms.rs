//! Greedy class-agnostic non-maximum suppression.

use crate::candidate::topk::{filter_candidates, DEFAULT_MAX_CANDIDATES};
use crate::candidate::DetectionCandidate;
use crate::geometry::iou;

/// Thresholds and ceiling for [`suppress_with`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NmsParams {
    /// Candidates scoring below this are dropped before suppression.
    pub score_threshold: f32,
    /// Candidates overlapping a kept one with `IOU >= iou_threshold` are removed.
    pub iou_threshold: f32,
    /// Upper bound on candidates entering the O(n^2) loop.
    pub max_candidates: usize,
}

impl Default for NmsParams {
    fn default() -> Self {
        Self {
            score_threshold: 0.5,
            iou_threshold: 0.75,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// Filters by score and runs greedy NMS with the default candidate ceiling.
pub fn suppress(
    candidates: Vec<DetectionCandidate>,
    score_threshold: f32,
    iou_threshold: f32,
) -> Vec<DetectionCandidate> {
    suppress_with(
        candidates,
        NmsParams {
            score_threshold,
            iou_threshold,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        },
    )
}

/// Filters by score and runs greedy NMS.
///
/// Each round moves the highest-scoring remaining candidate (earliest on
/// ties) to the output, then drops every remaining candidate whose IOU with
/// it is at least `iou_threshold`. Output is in selection order.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn suppress_with(
    candidates: Vec<DetectionCandidate>,
    params: NmsParams,
) -> Vec<DetectionCandidate> {
    let mut remaining =
        filter_candidates(candidates, params.score_threshold, params.max_candidates);
    let mut kept = Vec::new();

    while !remaining.is_empty() {
        let mut best_idx = 0usize;
        let mut best_score = remaining[0].score;
        for (idx, cand) in remaining.iter().enumerate().skip(1) {
            if cand.score > best_score {
                best_idx = idx;
                best_score = cand.score;
            }
        }

        let best = remaining.remove(best_idx);
        // NaN overlaps from degenerate boxes keep the candidate.
        remaining.retain(|cand| !(iou(&best.bbox, &cand.bbox) >= params.iou_threshold));
        kept.push(best);
    }

    kept
}
