//! Prototype-combination kernels and parallel helpers.

use crate::mask::grid::ScoreGrid;
use crate::tensor::TensorView;
use crate::util::DecodeResult;

/// Kernel computing `out[h, w] = sum_c coeffs[c] * protos[0, h, w, c]`.
pub trait CombineKernel {
    /// Combines the prototype planes of a `[1, H, W, C]` tensor.
    ///
    /// `coeffs.len()` must equal `C`. The result is `W` x `H`.
    fn combine(protos: TensorView<'_>, coeffs: &[f32]) -> DecodeResult<ScoreGrid>;
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

#[cfg(not(feature = "simd"))]
pub(crate) use scalar::CombineScalar as Combine;
#[cfg(feature = "simd")]
pub(crate) use simd::CombineSimd as Combine;

/// Combines prototype planes with the active kernel (`simd` when enabled).
pub fn combine_prototypes(protos: TensorView<'_>, coeffs: &[f32]) -> DecodeResult<ScoreGrid> {
    Combine::combine(protos, coeffs)
}
