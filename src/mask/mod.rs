//! Instance mask reconstruction from prototype masks.
//!
//! Each accepted candidate carries one coefficient per prototype channel.
//! Its mask is rebuilt in four stages:
//!
//! 1. linear combination of the prototype planes (`kernel::combine_prototypes`),
//! 2. logistic sigmoid,
//! 3. bilinear upsampling to the original image size,
//! 4. cropping to the candidate box (rescaled from model-input to image
//!    pixels) and thresholding.
//!
//! A coefficient/prototype length mismatch fails the whole batch.

pub mod crop;
pub mod grid;
pub mod upsample;

use crate::candidate::DetectionCandidate;
use crate::kernel::combine_prototypes;
use crate::tensor::TensorView;
use crate::trace::{trace_event, trace_span};
use crate::util::math::sigmoid;
use crate::util::DecodeResult;

use crop::crop_threshold;
use upsample::upsample_bilinear;

/// Default mask activation threshold.
pub const DEFAULT_MASK_THRESHOLD: f32 = 0.5;

/// Boolean per-pixel mask at original image resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceMask {
    data: Vec<bool>,
    width: usize,
    height: usize,
}

impl InstanceMask {
    /// Creates an all-false mask.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            data: vec![false; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the flag at column `x`, row `y` if in bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, value: bool) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&[bool]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Row-major flags.
    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    /// Number of set pixels.
    pub fn area(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// Parameters shared by every mask in one reconstruction call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskParams {
    /// Model input width the boxes are expressed in.
    pub input_width: usize,
    /// Model input height the boxes are expressed in.
    pub input_height: usize,
    /// Pixels at or above this activation are set.
    pub threshold: f32,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            input_width: 640,
            input_height: 640,
            threshold: DEFAULT_MASK_THRESHOLD,
        }
    }
}

/// Rebuilds the mask of one candidate at `target_width` x `target_height`.
pub fn reconstruct_one(
    candidate: &DetectionCandidate,
    protos: TensorView<'_>,
    target_width: usize,
    target_height: usize,
    params: &MaskParams,
) -> DecodeResult<InstanceMask> {
    let coeffs = candidate.mask_coeffs.as_deref().unwrap_or(&[]);
    let mut combined = combine_prototypes(protos, coeffs)?;
    combined.map_in_place(sigmoid);
    let upsampled = upsample_bilinear(&combined, target_width, target_height)?;

    let sx = target_width as f32 / params.input_width as f32;
    let sy = target_height as f32 / params.input_height as f32;
    let bbox = candidate.bbox.scaled(sx, sy);
    Ok(crop_threshold(&upsampled, &bbox, params.threshold))
}

/// Rebuilds masks for every candidate, in input order.
pub fn reconstruct(
    candidates: &[DetectionCandidate],
    protos: TensorView<'_>,
    target_width: usize,
    target_height: usize,
    params: &MaskParams,
) -> DecodeResult<Vec<InstanceMask>> {
    let _span = trace_span!(
        "reconstruct_masks",
        count = candidates.len(),
        width = target_width,
        height = target_height
    )
    .entered();

    let masks = candidates
        .iter()
        .map(|cand| reconstruct_one(cand, protos, target_width, target_height, params))
        .collect::<DecodeResult<Vec<_>>>()?;

    trace_event!("masks_reconstructed", count = masks.len());
    Ok(masks)
}

#[cfg(test)]
mod tests {
    use super::{reconstruct, reconstruct_one, InstanceMask, MaskParams};
    use crate::candidate::DetectionCandidate;
    use crate::geometry::BoundingBox;
    use crate::tensor::OwnedTensor;
    use crate::util::DecodeError;

    fn seg_candidate(bbox: BoundingBox, coeffs: Vec<f32>) -> DetectionCandidate {
        DetectionCandidate {
            mask_coeffs: Some(coeffs),
            ..DetectionCandidate::new(bbox, 0.9, 0)
        }
    }

    #[test]
    fn instance_mask_accessors() {
        let mut mask = InstanceMask::empty(3, 2);
        mask.set(2, 1, true);
        mask.set(5, 5, true);
        assert_eq!(mask.area(), 1);
        assert_eq!(mask.row(1).unwrap(), &[false, false, true]);
        assert_eq!(mask.get(3, 0), None);
    }

    #[test]
    fn rejects_coefficient_mismatch() {
        let protos = OwnedTensor::zeros([1, 2, 2, 3]).unwrap();
        let cand = seg_candidate(BoundingBox::new(0.0, 0.0, 4.0, 4.0), vec![0.0; 2]);
        let err = reconstruct_one(&cand, protos.view(), 4, 4, &MaskParams::default())
            .err()
            .unwrap();
        assert_eq!(
            err,
            DecodeError::Reconstruction {
                coefficients: 2,
                prototypes: 3
            }
        );
    }

    #[test]
    fn positive_prototype_fills_box_only() {
        let protos = OwnedTensor::new(vec![4.0; 4], [1, 2, 2, 1]).unwrap();
        let params = MaskParams {
            input_width: 8,
            input_height: 8,
            threshold: 0.5,
        };
        // Box covers the left half of the model input; image is 16 x 16.
        let cand = seg_candidate(BoundingBox::new(0.0, 0.0, 4.0, 8.0), vec![1.0]);
        let masks = reconstruct(&[cand], protos.view(), 16, 16, &params).unwrap();
        assert_eq!(masks.len(), 1);
        assert_eq!(masks[0].area(), 8 * 16);
        assert_eq!(masks[0].get(7, 15), Some(true));
        assert_eq!(masks[0].get(8, 0), Some(false));
    }
}
