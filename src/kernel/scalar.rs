//! Scalar reference kernel.

use crate::kernel::CombineKernel;
use crate::mask::grid::ScoreGrid;
use crate::tensor::TensorView;
use crate::util::{DecodeError, DecodeResult};

/// Checks `[1, H, W, C]` against the coefficient count and returns `(W, H)`.
pub(crate) fn combine_dims(protos: TensorView<'_>, coeffs: &[f32]) -> DecodeResult<(usize, usize)> {
    let shape = protos.shape();
    if shape.batch != 1 {
        return Err(DecodeError::layout(format!(
            "prototype tensor must have batch 1, got {:?}",
            shape.dims()
        )));
    }
    if coeffs.len() != shape.channels {
        return Err(DecodeError::Reconstruction {
            coefficients: coeffs.len(),
            prototypes: shape.channels,
        });
    }
    Ok((shape.width, shape.height))
}

/// Straightforward dot product per grid cell.
pub struct CombineScalar;

impl CombineKernel for CombineScalar {
    fn combine(protos: TensorView<'_>, coeffs: &[f32]) -> DecodeResult<ScoreGrid> {
        let (width, height) = combine_dims(protos, coeffs)?;
        let mut out = Vec::with_capacity(width * height);
        // NHWC with batch 1: cells are contiguous channel runs in row-major order.
        for cell in protos.as_slice().chunks_exact(coeffs.len()) {
            let value: f32 = cell.iter().zip(coeffs).map(|(p, c)| p * c).sum();
            out.push(value);
        }
        ScoreGrid::new(out, width, height)
    }
}
