//! Individual pipeline stages for callers assembling their own flow.
//!
//! Most users should go through [`crate::Decoder`]; these are the same
//! functions it calls, exposed one by one.

pub use crate::candidate::nms::{suppress, suppress_with, NmsParams};
pub use crate::decode::{
    check_slot_tensor, classify, decode_candidates, decode_row, DecodeParams, RowLayout,
};
pub use crate::geometry::iou;
pub use crate::kernel::scalar::CombineScalar;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::CombineSimd;
pub use crate::kernel::{combine_prototypes, CombineKernel};
pub use crate::mask::crop::{crop_threshold, pixel_span};
pub use crate::mask::grid::ScoreGrid;
pub use crate::mask::upsample::{sample_bilinear, sampling_ratio, upsample_bilinear};
pub use crate::mask::{reconstruct, reconstruct_one};
pub use crate::util::math::{lerp_unclamped, sigmoid};
