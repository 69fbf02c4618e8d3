//! Decoded detection candidates and their pruning.
//!
//! Includes the score-ceiling filter and greedy non-maximum suppression.

pub(crate) mod nms;
pub(crate) mod topk;

use crate::geometry::{BoundingBox, Keypoint};

/// One decoded tensor slot: geometry, best class and optional payloads.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionCandidate {
    /// Box in model-input pixel coordinates.
    pub bbox: BoundingBox,
    /// Selected score, not clamped to `[0, 1]`.
    pub score: f32,
    /// Selected class; always `0` for pose layouts.
    pub class_id: usize,
    /// Per-prototype mask coefficients (segmentation layouts only).
    pub mask_coeffs: Option<Vec<f32>>,
    /// Keypoints in model channel order (pose layouts only).
    pub keypoints: Option<Vec<Keypoint>>,
}

impl DetectionCandidate {
    /// Creates a plain detection candidate without payloads.
    pub fn new(bbox: BoundingBox, score: f32, class_id: usize) -> Self {
        Self {
            bbox,
            score,
            class_id,
            mask_coeffs: None,
            keypoints: None,
        }
    }
}
