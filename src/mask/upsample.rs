//! Bilinear upsampling of low-resolution mask grids.
//!
//! Target pixel `t` on each axis samples source coordinate
//! `t * (src_len - 1) / target_len`. This keeps the last target pixel just
//! short of the last source cell, so for true upsampling the `+1` neighbour
//! always exists; it is still clamped to the grid edge to keep every access
//! in bounds. Interpolation uses unclamped lerp weights.

use crate::mask::grid::ScoreGrid;
use crate::util::math::lerp_unclamped;
use crate::util::{DecodeError, DecodeResult};

/// Source-per-target sampling ratio along one axis.
pub fn sampling_ratio(src_len: usize, target_len: usize) -> f32 {
    (src_len.saturating_sub(1)) as f32 / target_len as f32
}

/// Samples `src` at fractional coordinate `(sx, sy)`.
///
/// Returns `None` when the coordinate is negative, non-finite or its floor
/// lies outside the grid. Integer coordinates return the grid value unchanged.
pub fn sample_bilinear(src: &ScoreGrid, sx: f32, sy: f32) -> Option<f32> {
    if !sx.is_finite() || !sy.is_finite() || sx < 0.0 || sy < 0.0 {
        return None;
    }
    let x0f = sx.floor();
    let y0f = sy.floor();
    let x0 = x0f as usize;
    let y0 = y0f as usize;
    if x0 >= src.width() || y0 >= src.height() {
        return None;
    }
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let fx = sx - x0f;
    let fy = sy - y0f;

    let top = lerp_unclamped(src.get(x0, y0)?, src.get(x1, y0)?, fx);
    let bottom = lerp_unclamped(src.get(x0, y1)?, src.get(x1, y1)?, fx);
    Some(lerp_unclamped(top, bottom, fy))
}

/// Resizes `src` to `target_width` x `target_height`.
pub fn upsample_bilinear(
    src: &ScoreGrid,
    target_width: usize,
    target_height: usize,
) -> DecodeResult<ScoreGrid> {
    if target_width == 0 || target_height == 0 {
        return Err(DecodeError::InvalidShape {
            shape: [1, target_height, target_width, 1],
        });
    }
    let ratio_x = sampling_ratio(src.width(), target_width);
    let ratio_y = sampling_ratio(src.height(), target_height);

    let mut out = Vec::with_capacity(target_width * target_height);
    for y in 0..target_height {
        let sy = y as f32 * ratio_y;
        for x in 0..target_width {
            let sx = x as f32 * ratio_x;
            let value = sample_bilinear(src, sx, sy).ok_or(DecodeError::IndexOutOfBounds {
                index: x.max(y),
                len: target_width.max(target_height),
                context: "upsample target",
            })?;
            out.push(value);
        }
    }
    ScoreGrid::new(out, target_width, target_height)
}
