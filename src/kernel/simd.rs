//! SIMD prototype combination using the `wide` crate.
//!
//! The channel dot product of each grid cell is vectorized eight lanes at a
//! time with `f32x8`; leftover channels fall back to scalar accumulation.
//! Summation order differs from the scalar kernel, so results agree only to
//! within float rounding.

use crate::kernel::scalar::combine_dims;
use crate::kernel::CombineKernel;
use crate::mask::grid::ScoreGrid;
use crate::tensor::TensorView;
use crate::util::DecodeResult;
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 f32 values into f32x8.
#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// Horizontal sum of f32x8.
#[inline]
fn hsum(v: f32x8) -> f32 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3] + arr[4] + arr[5] + arr[6] + arr[7]
}

#[inline]
fn dot(cell: &[f32], coeffs: &[f32]) -> f32 {
    let simd_end = coeffs.len() / LANES * LANES;
    let mut acc = f32x8::ZERO;
    for start in (0..simd_end).step_by(LANES) {
        let p = load_f32x8(&cell[start..start + LANES]);
        let c = load_f32x8(&coeffs[start..start + LANES]);
        acc += p * c;
    }
    let mut sum = hsum(acc);
    for idx in simd_end..coeffs.len() {
        sum += cell[idx] * coeffs[idx];
    }
    sum
}

/// SIMD-accelerated prototype combination.
pub struct CombineSimd;

impl CombineKernel for CombineSimd {
    fn combine(protos: TensorView<'_>, coeffs: &[f32]) -> DecodeResult<ScoreGrid> {
        let (width, height) = combine_dims(protos, coeffs)?;
        let out = protos
            .as_slice()
            .chunks_exact(coeffs.len())
            .map(|cell| dot(cell, coeffs))
            .collect();
        ScoreGrid::new(out, width, height)
    }
}
