//! Candidate decoding from packed tensor slots.
//!
//! The primary output tensor is expected as `[1, 1, N, C]`: `N` detection
//! slots along the column axis of a single row, each carrying `C` channels.
//! Channels `0..4` hold `(cx, cy, w, h)` in model-input pixels; the rest are
//! interpreted according to a [`RowLayout`].

pub mod layout;

use std::collections::BTreeMap;

use crate::candidate::DetectionCandidate;
use crate::geometry::{BoundingBox, Keypoint};
use crate::tensor::TensorView;
use crate::util::{DecodeError, DecodeResult};

pub use layout::{ArgmaxPolicy, Mode, RowLayout};
use layout::{GEOMETRY_CHANNELS, KEYPOINT_STRIDE, POSE_SCORE_CHANNEL};

/// Per-call decoding parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DecodeParams {
    /// Candidates whose selected score is below this are discarded.
    pub score_threshold: f32,
    /// Best-class selection rule.
    pub policy: ArgmaxPolicy,
}

/// Checks that `view` is a `[1, 1, N, C]` slot tensor matching `layout`.
///
/// Returns the slot count `N`.
pub fn check_slot_tensor(view: TensorView<'_>, layout: &RowLayout) -> DecodeResult<usize> {
    let shape = view.shape();
    if shape.batch != 1 || shape.height != 1 {
        return Err(DecodeError::layout(format!(
            "expected a [1, 1, N, C] tensor, got {:?}",
            shape.dims()
        )));
    }
    if shape.channels != layout.channels() {
        return Err(DecodeError::layout(format!(
            "tensor has {} channels, layout {:?} needs {}",
            shape.channels,
            layout,
            layout.channels()
        )));
    }
    Ok(shape.width)
}

/// Picks the best class under `policy`, returning `(class_id, score)`.
pub(crate) fn select_class(scores: &[f32], policy: ArgmaxPolicy) -> (usize, f32) {
    let mut best_id = 0usize;
    let mut best_score = policy.initial_score();
    for (idx, &score) in scores.iter().enumerate() {
        if score > best_score {
            best_id = idx;
            best_score = score;
        }
    }
    (best_id, best_score)
}

/// Decodes the channels of one slot; shape checks are the caller's job.
pub(crate) fn decode_channels(
    ch: &[f32],
    layout: &RowLayout,
    params: &DecodeParams,
) -> Option<DetectionCandidate> {
    let bbox = BoundingBox::from_center(ch[0], ch[1], ch[2], ch[3]);
    let candidate = match *layout {
        RowLayout::Classes { class_count } => {
            let scores = &ch[GEOMETRY_CHANNELS..GEOMETRY_CHANNELS + class_count];
            let (class_id, score) = select_class(scores, params.policy);
            DetectionCandidate::new(bbox, score, class_id)
        }
        RowLayout::Keypoints { .. } => {
            let keypoints = ch[POSE_SCORE_CHANNEL + 1..]
                .chunks_exact(KEYPOINT_STRIDE)
                .map(|kp| Keypoint::new(kp[0], kp[1], kp[2]))
                .collect();
            DetectionCandidate {
                keypoints: Some(keypoints),
                ..DetectionCandidate::new(bbox, ch[POSE_SCORE_CHANNEL], 0)
            }
        }
        RowLayout::MaskCoefficients { class_count, .. } => {
            let mask_start = GEOMETRY_CHANNELS + class_count;
            let (class_id, score) = select_class(&ch[GEOMETRY_CHANNELS..mask_start], params.policy);
            DetectionCandidate {
                mask_coeffs: Some(ch[mask_start..].to_vec()),
                ..DetectionCandidate::new(bbox, score, class_id)
            }
        }
    };

    if candidate.score.is_nan() || candidate.score < params.score_threshold {
        return None;
    }
    Some(candidate)
}

/// Decodes slot `row` of a `[1, 1, N, C]` tensor.
///
/// Returns `Ok(None)` when the selected score is below the threshold.
pub fn decode_row(
    view: TensorView<'_>,
    row: usize,
    layout: &RowLayout,
    params: &DecodeParams,
) -> DecodeResult<Option<DetectionCandidate>> {
    let slots = check_slot_tensor(view, layout)?;
    let ch = view
        .channels_at(0, 0, row)
        .ok_or_else(|| DecodeError::layout(format!("row {row} out of range for {slots} slots")))?;
    Ok(decode_channels(ch, layout, params))
}

/// Decodes every slot, keeping candidates at or above the score threshold.
///
/// Output preserves slot order.
pub fn decode_candidates(
    view: TensorView<'_>,
    layout: &RowLayout,
    params: &DecodeParams,
) -> DecodeResult<Vec<DetectionCandidate>> {
    let slots = check_slot_tensor(view, layout)?;
    let data = view.as_slice();
    debug_assert_eq!(data.len(), slots * layout.channels());
    Ok(data
        .chunks_exact(layout.channels())
        .filter_map(|ch| decode_channels(ch, layout, params))
        .collect())
}

/// Reads per-class scores at position `(0, 0, 0)` of a classification output.
///
/// Returns every class whose score is at or above `score_threshold`.
pub fn classify(view: TensorView<'_>, score_threshold: f32) -> DecodeResult<BTreeMap<usize, f32>> {
    let shape = view.shape();
    if shape.batch != 1 {
        return Err(DecodeError::layout(format!(
            "classification expects batch 1, got {}",
            shape.batch
        )));
    }
    let scores = view
        .channels_at(0, 0, 0)
        .ok_or_else(|| DecodeError::layout("classification tensor has no elements"))?;
    Ok(scores
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, score)| score >= score_threshold)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{select_class, ArgmaxPolicy};

    #[test]
    fn zero_floor_ignores_non_positive_scores() {
        assert_eq!(select_class(&[-0.5, -0.1], ArgmaxPolicy::ZeroFloor), (0, 0.0));
        assert_eq!(select_class(&[0.0, 0.0, 0.2], ArgmaxPolicy::ZeroFloor), (2, 0.2));
    }

    #[test]
    fn unbounded_picks_true_max() {
        assert_eq!(select_class(&[-0.5, -0.1], ArgmaxPolicy::Unbounded), (1, -0.1));
    }

    #[test]
    fn lowest_index_wins_ties() {
        assert_eq!(select_class(&[0.3, 0.7, 0.7], ArgmaxPolicy::ZeroFloor), (1, 0.7));
    }
}
