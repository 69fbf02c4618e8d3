//! Row layouts and the channel arithmetic that resolves them.

use crate::util::{DecodeError, DecodeResult};

/// Number of leading geometry channels `(cx, cy, w, h)`.
pub const GEOMETRY_CHANNELS: usize = 4;
/// Channel holding the object confidence in pose layouts.
pub const POSE_SCORE_CHANNEL: usize = 4;
/// Channels per keypoint `(x, y, visibility)`.
pub const KEYPOINT_STRIDE: usize = 3;

/// Output interpretation selected by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// One score per class at a single position; no geometry.
    Classification,
    /// Geometry followed by one score per class.
    #[default]
    Detection,
    /// Geometry, one confidence channel, then `(x, y, v)` keypoint triples.
    Pose,
    /// Geometry, class scores, then one coefficient per prototype mask.
    ///
    /// `class_count` is derived from the prototype tensor when `None`.
    Segmentation { class_count: Option<usize> },
}

/// How the best class is chosen from the class-score channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArgmaxPolicy {
    /// Running best starts at score `0.0`, class `0`; a class must beat it
    /// strictly. Classes whose scores are all `<= 0` are never selected and
    /// the lowest index wins ties.
    #[default]
    ZeroFloor,
    /// Running best starts at negative infinity (plain argmax, lowest index
    /// wins ties).
    Unbounded,
}

impl ArgmaxPolicy {
    pub(crate) fn initial_score(self) -> f32 {
        match self {
            ArgmaxPolicy::ZeroFloor => 0.0,
            ArgmaxPolicy::Unbounded => f32::NEG_INFINITY,
        }
    }
}

/// Resolved interpretation of the trailing channels of one tensor slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowLayout {
    /// `4 + class_count` channels.
    Classes { class_count: usize },
    /// `5 + 3 * keypoint_count` channels.
    Keypoints { keypoint_count: usize },
    /// `4 + class_count + mask_channels` channels.
    MaskCoefficients {
        class_count: usize,
        mask_channels: usize,
    },
}

impl RowLayout {
    /// Plain detection layout for a tensor with `channels` channels.
    ///
    /// At least one class channel must follow the geometry.
    pub fn detection(channels: usize) -> DecodeResult<Self> {
        let class_count = channels.checked_sub(GEOMETRY_CHANNELS).ok_or_else(|| {
            DecodeError::layout(format!(
                "{channels} channels, need at least {GEOMETRY_CHANNELS} geometry channels"
            ))
        })?;
        if class_count == 0 {
            return Err(DecodeError::layout(format!(
                "{channels} channels leave no class score channels"
            )));
        }
        Ok(RowLayout::Classes { class_count })
    }

    /// Pose layout; the keypoint channels must split evenly into triples.
    pub fn pose(channels: usize) -> DecodeResult<Self> {
        let extra = channels
            .checked_sub(POSE_SCORE_CHANNEL + 1)
            .ok_or_else(|| {
                DecodeError::layout(format!(
                    "{channels} channels, pose rows need geometry plus a confidence channel"
                ))
            })?;
        if extra % KEYPOINT_STRIDE != 0 {
            return Err(DecodeError::layout(format!(
                "{extra} keypoint channels are not a multiple of {KEYPOINT_STRIDE}"
            )));
        }
        Ok(RowLayout::Keypoints {
            keypoint_count: extra / KEYPOINT_STRIDE,
        })
    }

    /// Segmentation layout for `mask_channels` prototypes.
    ///
    /// A supplied `class_count` must agree with
    /// `channels - mask_channels - 4`, which must be non-zero.
    pub fn segmentation(
        channels: usize,
        mask_channels: usize,
        class_count: Option<usize>,
    ) -> DecodeResult<Self> {
        let derived = channels
            .checked_sub(GEOMETRY_CHANNELS)
            .and_then(|v| v.checked_sub(mask_channels))
            .ok_or_else(|| {
                DecodeError::layout(format!(
                    "{channels} channels cannot hold {GEOMETRY_CHANNELS} geometry and {mask_channels} mask channels"
                ))
            })?;
        if derived == 0 {
            return Err(DecodeError::layout(format!(
                "{channels} channels leave no class score channels beside {mask_channels} mask channels"
            )));
        }
        if let Some(expected) = class_count {
            if expected != derived {
                return Err(DecodeError::layout(format!(
                    "class count {expected} disagrees with {derived} derived from {mask_channels} prototypes"
                )));
            }
        }
        Ok(RowLayout::MaskCoefficients {
            class_count: derived,
            mask_channels,
        })
    }

    /// Total channels a slot must have for this layout.
    pub fn channels(&self) -> usize {
        match *self {
            RowLayout::Classes { class_count } => GEOMETRY_CHANNELS + class_count,
            RowLayout::Keypoints { keypoint_count } => {
                POSE_SCORE_CHANNEL + 1 + KEYPOINT_STRIDE * keypoint_count
            }
            RowLayout::MaskCoefficients {
                class_count,
                mask_channels,
            } => GEOMETRY_CHANNELS + class_count + mask_channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RowLayout;
    use crate::util::DecodeError;

    #[test]
    fn detection_requires_geometry() {
        assert_eq!(
            RowLayout::detection(84).unwrap(),
            RowLayout::Classes { class_count: 80 }
        );
        assert!(matches!(
            RowLayout::detection(3),
            Err(DecodeError::InvalidLayout { .. })
        ));
        assert!(matches!(
            RowLayout::detection(4),
            Err(DecodeError::InvalidLayout { .. })
        ));
    }

    #[test]
    fn pose_requires_whole_triples() {
        assert_eq!(
            RowLayout::pose(56).unwrap(),
            RowLayout::Keypoints { keypoint_count: 17 }
        );
        assert!(RowLayout::pose(57).is_err());
        assert!(RowLayout::pose(4).is_err());
    }

    #[test]
    fn segmentation_derives_and_checks_class_count() {
        let layout = RowLayout::segmentation(116, 32, None).unwrap();
        assert_eq!(
            layout,
            RowLayout::MaskCoefficients {
                class_count: 80,
                mask_channels: 32
            }
        );
        assert_eq!(layout.channels(), 116);
        assert!(RowLayout::segmentation(116, 32, Some(80)).is_ok());
        assert!(RowLayout::segmentation(116, 32, Some(79)).is_err());
        assert!(RowLayout::segmentation(30, 32, None).is_err());
        assert!(matches!(
            RowLayout::segmentation(36, 32, None),
            Err(DecodeError::InvalidLayout { .. })
        ));
        assert!(RowLayout::segmentation(36, 32, Some(0)).is_err());
    }
}
