//! End-to-end decoding: slots -> candidates -> NMS -> masks.
//!
//! `Decoder` is stateless apart from its configuration; every call is a pure
//! function of the tensors passed in.

pub mod config;
pub mod detection;

use std::collections::BTreeMap;

use crate::candidate::nms::suppress_with;
use crate::candidate::DetectionCandidate;
use crate::decode::{classify, decode_candidates, Mode, RowLayout};
#[cfg(feature = "rayon")]
use crate::kernel::rayon::{decode_candidates_par, reconstruct_par};
use crate::mask::{reconstruct, InstanceMask};
use crate::tensor::TensorView;
use crate::trace::{trace_event, trace_span};
use crate::util::{DecodeError, DecodeResult};

pub use config::{DecodeConfig, ImageSize};
pub use detection::Detection;

/// Result of [`Decoder::run`].
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    /// Class id -> score for every class at or above the score threshold.
    Classes(BTreeMap<usize, f32>),
    /// Detections in selection order (highest score first).
    Detections(Vec<Detection>),
}

/// Post-processor for one model's outputs.
#[derive(Clone, Debug)]
pub struct Decoder {
    cfg: DecodeConfig,
}

impl Decoder {
    /// Creates a decoder after validating `cfg`.
    pub fn new(cfg: DecodeConfig) -> DecodeResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DecodeConfig {
        &self.cfg
    }

    /// Dispatches on the configured [`Mode`].
    ///
    /// `protos` is required for segmentation and ignored otherwise. `image`
    /// is the original image size the masks are rendered at.
    pub fn run(
        &self,
        output: TensorView<'_>,
        protos: Option<TensorView<'_>>,
        image: ImageSize,
    ) -> DecodeResult<Output> {
        match self.cfg.mode {
            Mode::Classification => self.classify(output).map(Output::Classes),
            Mode::Detection => self.detect(output).map(Output::Detections),
            Mode::Pose => self.detect_pose(output).map(Output::Detections),
            Mode::Segmentation { .. } => {
                let protos = protos.ok_or_else(|| {
                    DecodeError::layout("segmentation requires a prototype tensor")
                })?;
                self.segment(output, protos, image).map(Output::Detections)
            }
        }
    }

    /// Classification: per-class scores at or above the threshold.
    pub fn classify(&self, output: TensorView<'_>) -> DecodeResult<BTreeMap<usize, f32>> {
        let _span = trace_span!("classify", channels = output.channels()).entered();
        let classes = classify(output, self.cfg.score_threshold)?;
        trace_event!("classes_kept", count = classes.len());
        Ok(classes)
    }

    /// Plain detection: geometry plus one score per class.
    pub fn detect(&self, output: TensorView<'_>) -> DecodeResult<Vec<Detection>> {
        let _span = trace_span!("detect", channels = output.channels()).entered();
        let layout = RowLayout::detection(output.channels())?;
        let kept = self.decode_and_suppress(output, &layout)?;
        Ok(kept.into_iter().map(Detection::from_candidate).collect())
    }

    /// Pose: geometry, one confidence channel and keypoint triples.
    pub fn detect_pose(&self, output: TensorView<'_>) -> DecodeResult<Vec<Detection>> {
        let _span = trace_span!("detect_pose", channels = output.channels()).entered();
        let layout = RowLayout::pose(output.channels())?;
        let kept = self.decode_and_suppress(output, &layout)?;
        Ok(kept.into_iter().map(Detection::from_candidate).collect())
    }

    /// Segmentation: detection plus one full-image mask per survivor.
    pub fn segment(
        &self,
        output: TensorView<'_>,
        protos: TensorView<'_>,
        image: ImageSize,
    ) -> DecodeResult<Vec<Detection>> {
        let _span = trace_span!(
            "segment",
            channels = output.channels(),
            prototypes = protos.channels()
        )
        .entered();

        let class_count = match self.cfg.mode {
            Mode::Segmentation { class_count } => class_count,
            _ => None,
        };
        let layout = RowLayout::segmentation(output.channels(), protos.channels(), class_count)?;
        let kept = self.decode_and_suppress(output, &layout)?;
        let masks = self.reconstruct(&kept, protos, image)?;

        Ok(kept
            .into_iter()
            .zip(masks)
            .map(|(cand, mask)| Detection {
                mask: Some(mask),
                ..Detection::from_candidate(cand)
            })
            .collect())
    }

    fn decode_and_suppress(
        &self,
        output: TensorView<'_>,
        layout: &RowLayout,
    ) -> DecodeResult<Vec<DetectionCandidate>> {
        let params = self.cfg.decode_params();

        #[cfg(feature = "rayon")]
        let candidates = if self.cfg.parallel {
            decode_candidates_par(output, layout, &params)?
        } else {
            decode_candidates(output, layout, &params)?
        };
        #[cfg(not(feature = "rayon"))]
        let candidates = decode_candidates(output, layout, &params)?;

        trace_event!("candidates_decoded", count = candidates.len());
        let kept = suppress_with(candidates, self.cfg.nms_params());
        trace_event!("detections_kept", count = kept.len());
        Ok(kept)
    }

    fn reconstruct(
        &self,
        kept: &[DetectionCandidate],
        protos: TensorView<'_>,
        image: ImageSize,
    ) -> DecodeResult<Vec<InstanceMask>> {
        let params = self.cfg.mask_params();

        #[cfg(feature = "rayon")]
        {
            if self.cfg.parallel {
                reconstruct_par(kept, protos, image.width, image.height, &params)
            } else {
                reconstruct(kept, protos, image.width, image.height, &params)
            }
        }
        #[cfg(not(feature = "rayon"))]
        {
            reconstruct(kept, protos, image.width, image.height, &params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeConfig, Decoder, ImageSize, Output};
    use crate::decode::Mode;
    use crate::tensor::OwnedTensor;

    #[test]
    fn run_dispatches_classification() {
        let tensor = OwnedTensor::new(vec![0.1, 0.7, 0.5], [1, 1, 1, 3]).unwrap();
        let decoder = Decoder::new(DecodeConfig {
            mode: Mode::Classification,
            ..DecodeConfig::default()
        })
        .unwrap();
        let out = decoder
            .run(tensor.view(), None, ImageSize::new(1, 1))
            .unwrap();
        let Output::Classes(classes) = out else {
            panic!("expected classes");
        };
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[&1], 0.7);
        assert_eq!(classes[&2], 0.5);
    }

    #[test]
    fn segmentation_without_prototypes_fails() {
        let tensor = OwnedTensor::zeros([1, 1, 2, 6]).unwrap();
        let decoder = Decoder::new(DecodeConfig {
            mode: Mode::Segmentation { class_count: None },
            ..DecodeConfig::default()
        })
        .unwrap();
        assert!(decoder
            .run(tensor.view(), None, ImageSize::new(4, 4))
            .is_err());
    }
}
