//! yolodecode turns raw YOLO-style network outputs into detections.
//!
//! The crate covers the CPU post-processing stage only: decoding packed
//! tensor slots into candidates, class-agnostic non-maximum suppression and
//! reconstruction of instance masks from prototype planes. Running the
//! network itself is left to the caller.
//!
//! Optional features: `rayon` (parallel slot decoding and mask
//! reconstruction), `simd` (vectorized prototype combination), `image-io`
//! (mask export through the `image` crate) and `tracing` (spans and events).

mod candidate;
pub mod decode;
pub mod geometry;
#[cfg(feature = "image-io")]
pub mod io;
pub mod kernel;
pub mod lowlevel;
pub mod mask;
pub mod pipeline;
pub mod tensor;
mod trace;
pub mod util;

pub use candidate::nms::{suppress, suppress_with, NmsParams};
pub use candidate::topk::DEFAULT_MAX_CANDIDATES;
pub use candidate::DetectionCandidate;
pub use decode::{ArgmaxPolicy, Mode, RowLayout};
pub use geometry::{iou, BoundingBox, Keypoint, COCO_KEYPOINTS};
pub use mask::{InstanceMask, MaskParams, DEFAULT_MASK_THRESHOLD};
pub use pipeline::{DecodeConfig, Decoder, Detection, ImageSize, Output};
pub use tensor::{OwnedTensor, TensorShape, TensorView};
pub use util::{DecodeError, DecodeResult};
