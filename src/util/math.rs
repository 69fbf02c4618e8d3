//! Scalar helpers shared by the decoder and the mask reconstructor.

/// Logistic sigmoid `1 / (1 + e^-x)`.
///
/// Returns exactly `0.5` at zero. Saturates to `0.0` / `1.0` in `f32` once
/// `|x|` grows past roughly 17 (upper side) or 88 (lower side).
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Linear interpolation without clamping `t` to `[0, 1]`.
#[inline]
pub fn lerp_unclamped(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Truncates toward zero and clamps into `[0, max]`.
///
/// NaN and negative infinity map to `0`; positive infinity maps to `max`.
#[inline]
pub(crate) fn trunc_clamp(value: f32, max: usize) -> usize {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    let truncated = value.trunc();
    if truncated >= max as f32 {
        max
    } else {
        truncated as usize
    }
}
