//! Rayon-parallel decoding and mask reconstruction (feature-gated).
//!
//! Slot decoding is independent per slot and mask reconstruction is
//! independent per candidate; both preserve input order so results match
//! the sequential path exactly. Suppression stays sequential.

use crate::candidate::DetectionCandidate;
use crate::decode::{check_slot_tensor, decode_channels, DecodeParams, RowLayout};
use crate::mask::{reconstruct_one, InstanceMask, MaskParams};
use crate::tensor::TensorView;
use crate::util::DecodeResult;
use rayon::prelude::*;

/// Slot-parallel version of [`crate::decode::decode_candidates`].
pub fn decode_candidates_par(
    view: TensorView<'_>,
    layout: &RowLayout,
    params: &DecodeParams,
) -> DecodeResult<Vec<DetectionCandidate>> {
    check_slot_tensor(view, layout)?;
    Ok(view
        .as_slice()
        .par_chunks_exact(layout.channels())
        .filter_map(|ch| decode_channels(ch, layout, params))
        .collect())
}

/// Candidate-parallel version of [`crate::mask::reconstruct`].
pub fn reconstruct_par(
    candidates: &[DetectionCandidate],
    protos: TensorView<'_>,
    target_width: usize,
    target_height: usize,
    params: &MaskParams,
) -> DecodeResult<Vec<InstanceMask>> {
    candidates
        .par_iter()
        .map(|cand| reconstruct_one(cand, protos, target_width, target_height, params))
        .collect()
}
