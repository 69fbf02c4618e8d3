//! Borrowed and owned 4-D tensor containers.
//!
//! `TensorView` is a read-only NHWC view into a contiguous `f32` buffer:
//! element `(b, h, w, c)` lives at `((b * height + h) * width + w) * channels + c`.
//! The view never copies; `OwnedTensor` exists for callers (and tests) that
//! need to hold the data themselves.

use crate::util::{DecodeError, DecodeResult};

/// Shape of a 4-D tensor in `(batch, height, width, channels)` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TensorShape {
    /// Batch size. The decoder only accepts `1`.
    pub batch: usize,
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
    /// Number of channels per element.
    pub channels: usize,
}

impl TensorShape {
    /// Creates a shape from its four dimensions.
    pub fn new(batch: usize, height: usize, width: usize, channels: usize) -> Self {
        Self {
            batch,
            height,
            width,
            channels,
        }
    }

    /// Returns the dimensions as an array.
    pub fn dims(&self) -> [usize; 4] {
        [self.batch, self.height, self.width, self.channels]
    }

    /// Returns the total element count, or an error for empty or overflowing shapes.
    pub fn element_count(&self) -> DecodeResult<usize> {
        let dims = self.dims();
        if dims.contains(&0) {
            return Err(DecodeError::InvalidShape { shape: dims });
        }
        dims.iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(DecodeError::InvalidShape { shape: dims })
    }

    fn offset(&self, b: usize, h: usize, w: usize, c: usize) -> Option<usize> {
        if b >= self.batch || h >= self.height || w >= self.width || c >= self.channels {
            return None;
        }
        let idx = b
            .checked_mul(self.height)?
            .checked_add(h)?
            .checked_mul(self.width)?
            .checked_add(w)?
            .checked_mul(self.channels)?
            .checked_add(c)?;
        Some(idx)
    }
}

impl From<[usize; 4]> for TensorShape {
    fn from(dims: [usize; 4]) -> Self {
        Self::new(dims[0], dims[1], dims[2], dims[3])
    }
}

/// Borrowed NHWC tensor view.
#[derive(Copy, Clone, Debug)]
pub struct TensorView<'a> {
    data: &'a [f32],
    shape: TensorShape,
}

impl<'a> TensorView<'a> {
    /// Creates a view over `data` with the given shape.
    ///
    /// Trailing elements beyond the shape are ignored.
    pub fn new(data: &'a [f32], shape: impl Into<TensorShape>) -> DecodeResult<Self> {
        let shape = shape.into();
        let needed = shape.element_count()?;
        if data.len() < needed {
            return Err(DecodeError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data: &data[..needed],
            shape,
        })
    }

    /// Returns the tensor shape.
    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    /// Returns the channel count.
    pub fn channels(&self) -> usize {
        self.shape.channels
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the element at `(b, h, w, c)` if it is within bounds.
    pub fn get(&self, b: usize, h: usize, w: usize, c: usize) -> Option<f32> {
        let idx = self.shape.offset(b, h, w, c)?;
        self.data.get(idx).copied()
    }

    /// Returns all channels of element `(b, h, w)` as a contiguous slice.
    pub fn channels_at(&self, b: usize, h: usize, w: usize) -> Option<&'a [f32]> {
        let start = self.shape.offset(b, h, w, 0)?;
        let end = start.checked_add(self.shape.channels)?;
        self.data.get(start..end)
    }
}

/// Owned contiguous NHWC tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedTensor {
    data: Vec<f32>,
    shape: TensorShape,
}

impl OwnedTensor {
    /// Creates an owned tensor; the buffer length must match the shape exactly.
    pub fn new(data: Vec<f32>, shape: impl Into<TensorShape>) -> DecodeResult<Self> {
        let shape = shape.into();
        let needed = shape.element_count()?;
        if data.len() < needed {
            return Err(DecodeError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(DecodeError::InvalidShape {
                shape: shape.dims(),
            });
        }
        Ok(Self { data, shape })
    }

    /// Creates a zero-filled tensor.
    pub fn zeros(shape: impl Into<TensorShape>) -> DecodeResult<Self> {
        let shape = shape.into();
        let needed = shape.element_count()?;
        Ok(Self {
            data: vec![0.0; needed],
            shape,
        })
    }

    /// Creates a `[1, 1, rows.len(), channels]` tensor from per-slot channel rows.
    ///
    /// Every row must have the same length.
    pub fn from_rows(rows: &[Vec<f32>]) -> DecodeResult<Self> {
        let channels = rows.first().map(Vec::len).unwrap_or(0);
        let shape = TensorShape::new(1, 1, rows.len(), channels);
        let mut data = Vec::with_capacity(rows.len() * channels);
        for row in rows {
            if row.len() != channels {
                return Err(DecodeError::InvalidShape {
                    shape: shape.dims(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(data, shape)
    }

    /// Returns a borrowed view.
    pub fn view(&self) -> TensorView<'_> {
        TensorView {
            data: &self.data,
            shape: self.shape,
        }
    }

    /// Returns the tensor shape.
    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    /// Sets the element at `(b, h, w, c)`.
    pub fn set(&mut self, b: usize, h: usize, w: usize, c: usize, value: f32) -> DecodeResult<()> {
        let idx = self
            .shape
            .offset(b, h, w, c)
            .ok_or(DecodeError::IndexOutOfBounds {
                index: c,
                len: self.shape.channels,
                context: "tensor element",
            })?;
        self.data[idx] = value;
        Ok(())
    }

    /// Returns the backing buffer.
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::{OwnedTensor, TensorShape, TensorView};

    #[test]
    fn offsets_follow_nhwc_order() {
        let data: Vec<f32> = (0..24).map(|v| v as f32).collect();
        let view = TensorView::new(&data, [1, 2, 3, 4]).unwrap();
        assert_eq!(view.get(0, 0, 0, 0), Some(0.0));
        assert_eq!(view.get(0, 0, 1, 0), Some(4.0));
        assert_eq!(view.get(0, 1, 0, 0), Some(12.0));
        assert_eq!(view.get(0, 1, 2, 3), Some(23.0));
        assert_eq!(view.get(0, 2, 0, 0), None);
        assert_eq!(view.channels_at(0, 1, 1).unwrap(), &[16.0, 17.0, 18.0, 19.0]);
    }

    #[test]
    fn from_rows_builds_slot_tensor() {
        let tensor = OwnedTensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(tensor.shape(), TensorShape::new(1, 1, 2, 2));
        assert_eq!(tensor.view().get(0, 0, 1, 0), Some(3.0));
        assert!(OwnedTensor::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn set_writes_in_place() {
        let mut tensor = OwnedTensor::zeros([1, 2, 2, 1]).unwrap();
        tensor.set(0, 1, 0, 0, 5.0).unwrap();
        assert_eq!(tensor.data(), &[0.0, 0.0, 5.0, 0.0]);
        assert!(tensor.set(0, 2, 0, 0, 1.0).is_err());
    }
}
