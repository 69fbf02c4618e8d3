//! Final detection records handed back to callers.

use crate::candidate::DetectionCandidate;
use crate::geometry::{BoundingBox, Keypoint};
use crate::mask::InstanceMask;
use crate::pipeline::config::ImageSize;

/// One surviving detection.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Box in model-input pixels; see [`Detection::scaled_to`].
    pub bbox: BoundingBox,
    pub score: f32,
    /// `None` for pose outputs, which carry no class channels.
    pub class_id: Option<usize>,
    pub keypoints: Option<Vec<Keypoint>>,
    /// Full-image mask (segmentation only).
    pub mask: Option<InstanceMask>,
}

impl Detection {
    pub(crate) fn from_candidate(candidate: DetectionCandidate) -> Self {
        let class_id = if candidate.keypoints.is_some() {
            None
        } else {
            Some(candidate.class_id)
        };
        Self {
            bbox: candidate.bbox,
            score: candidate.score,
            class_id,
            keypoints: candidate.keypoints,
            mask: None,
        }
    }

    /// Returns a copy with box and keypoints rescaled from `input` to `image` pixels.
    ///
    /// The mask is already at image resolution and is carried unchanged.
    pub fn scaled_to(&self, input: ImageSize, image: ImageSize) -> Self {
        let sx = image.width as f32 / input.width as f32;
        let sy = image.height as f32 / input.height as f32;
        Self {
            bbox: self.bbox.scaled(sx, sy),
            score: self.score,
            class_id: self.class_id,
            keypoints: self
                .keypoints
                .as_ref()
                .map(|kps| kps.iter().map(|kp| kp.scaled(sx, sy)).collect()),
            mask: self.mask.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Detection;
    use crate::candidate::DetectionCandidate;
    use crate::geometry::{BoundingBox, Keypoint};
    use crate::pipeline::config::ImageSize;

    #[test]
    fn pose_candidates_have_no_class() {
        let cand = DetectionCandidate {
            keypoints: Some(vec![Keypoint::new(1.0, 2.0, 0.9)]),
            ..DetectionCandidate::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 0.8, 0)
        };
        assert_eq!(Detection::from_candidate(cand).class_id, None);
    }

    #[test]
    fn scaled_to_maps_input_to_image() {
        let cand = DetectionCandidate {
            keypoints: Some(vec![Keypoint::new(320.0, 160.0, 0.5)]),
            ..DetectionCandidate::new(BoundingBox::new(0.0, 0.0, 640.0, 320.0), 0.8, 0)
        };
        let det = Detection::from_candidate(cand)
            .scaled_to(ImageSize::new(640, 640), ImageSize::new(1280, 320));
        assert_eq!(det.bbox, BoundingBox::new(0.0, 0.0, 1280.0, 160.0));
        assert_eq!(det.keypoints.unwrap()[0], Keypoint::new(640.0, 80.0, 0.5));
    }
}
