//! Error types for yolodecode.

use thiserror::Error;

/// Result alias for yolodecode operations.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur while decoding network outputs.
///
/// An empty detection list is not an error; callers receive `Ok(vec![])`.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DecodeError {
    /// Tensor shape does not agree with the requested row layout.
    #[error("invalid layout: {reason}")]
    InvalidLayout { reason: String },
    /// A tensor dimension is zero or the element count overflows.
    #[error("invalid tensor shape {shape:?}")]
    InvalidShape { shape: [usize; 4] },
    /// The backing buffer is smaller than the shape requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// An index is outside the valid range for its axis.
    #[error("{context} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        context: &'static str,
    },
    /// Mask coefficients disagree with the prototype tensor.
    #[error("mask reconstruction failed: {coefficients} coefficients for {prototypes} prototypes")]
    Reconstruction {
        coefficients: usize,
        prototypes: usize,
    },
    /// A configuration value is out of its valid range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// Image export failed.
    #[cfg(feature = "image-io")]
    #[error("image i/o error: {reason}")]
    ImageIo { reason: String },
}

impl DecodeError {
    pub(crate) fn layout(reason: impl Into<String>) -> Self {
        DecodeError::InvalidLayout {
            reason: reason.into(),
        }
    }
}
