//! Per-invocation configuration for the decoding pipeline.

use crate::candidate::nms::NmsParams;
use crate::candidate::topk::DEFAULT_MAX_CANDIDATES;
use crate::decode::{ArgmaxPolicy, DecodeParams, Mode};
use crate::mask::{MaskParams, DEFAULT_MASK_THRESHOLD};
use crate::util::{DecodeError, DecodeResult};

/// Width and height of an image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

impl ImageSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// Configuration for [`crate::Decoder`].
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeConfig {
    /// Output interpretation used by [`crate::Decoder::run`].
    pub mode: Mode,
    /// Minimum selected score for a candidate to be kept.
    pub score_threshold: f32,
    /// Overlap at or above which lower-scoring candidates are suppressed.
    pub iou_threshold: f32,
    /// Mask activation at or above which a pixel is set.
    pub mask_threshold: f32,
    /// Upper bound on candidates entering suppression.
    pub max_candidates: usize,
    /// Best-class selection rule.
    pub policy: ArgmaxPolicy,
    /// Model input size the tensor coordinates are expressed in.
    pub input_size: ImageSize,
    /// Decode slots and reconstruct masks on the rayon pool.
    pub parallel: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Detection,
            score_threshold: 0.5,
            iou_threshold: 0.75,
            mask_threshold: DEFAULT_MASK_THRESHOLD,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            policy: ArgmaxPolicy::ZeroFloor,
            input_size: ImageSize::new(640, 640),
            parallel: false,
        }
    }
}

impl DecodeConfig {
    /// Checks value ranges and feature availability.
    pub fn validate(&self) -> DecodeResult<()> {
        if !self.score_threshold.is_finite() {
            return Err(DecodeError::InvalidConfig("score_threshold must be finite"));
        }
        if !self.iou_threshold.is_finite() {
            return Err(DecodeError::InvalidConfig("iou_threshold must be finite"));
        }
        if !self.mask_threshold.is_finite() {
            return Err(DecodeError::InvalidConfig("mask_threshold must be finite"));
        }
        if self.max_candidates == 0 {
            return Err(DecodeError::InvalidConfig("max_candidates must be at least 1"));
        }
        if self.input_size.width == 0 || self.input_size.height == 0 {
            return Err(DecodeError::InvalidConfig("input_size must be non-zero"));
        }
        if self.parallel && !cfg!(feature = "rayon") {
            return Err(DecodeError::InvalidConfig(
                "parallel requires the rayon feature",
            ));
        }
        Ok(())
    }

    pub(crate) fn decode_params(&self) -> DecodeParams {
        DecodeParams {
            score_threshold: self.score_threshold,
            policy: self.policy,
        }
    }

    pub(crate) fn nms_params(&self) -> NmsParams {
        NmsParams {
            score_threshold: self.score_threshold,
            iou_threshold: self.iou_threshold,
            max_candidates: self.max_candidates,
        }
    }

    pub(crate) fn mask_params(&self) -> MaskParams {
        MaskParams {
            input_width: self.input_size.width,
            input_height: self.input_size.height,
            threshold: self.mask_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DecodeConfig;
    use crate::util::DecodeError;

    #[test]
    fn default_is_valid() {
        assert!(DecodeConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_nan_threshold() {
        let cfg = DecodeConfig {
            iou_threshold: f32::NAN,
            ..DecodeConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(DecodeError::InvalidConfig("iou_threshold must be finite"))
        );
    }

    #[test]
    fn rejects_zero_ceiling() {
        let cfg = DecodeConfig {
            max_candidates: 0,
            ..DecodeConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[cfg(not(feature = "rayon"))]
    #[test]
    fn parallel_needs_rayon() {
        let cfg = DecodeConfig {
            parallel: true,
            ..DecodeConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
