//! Dense row-major `f32` grid used by the mask stages.

use crate::util::{DecodeError, DecodeResult};

/// Owned 2-D float grid, `width` columns by `height` rows.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreGrid {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl ScoreGrid {
    /// Creates a grid; `data.len()` must equal `width * height`.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> DecodeResult<Self> {
        let shape = [1, height, width, 1];
        if width == 0 || height == 0 {
            return Err(DecodeError::InvalidShape { shape });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(DecodeError::InvalidShape { shape })?;
        if data.len() < needed {
            return Err(DecodeError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(DecodeError::InvalidShape { shape });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates a grid filled with `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> DecodeResult<Self> {
        let needed = width
            .checked_mul(height)
            .ok_or(DecodeError::InvalidShape {
                shape: [1, height, width, 1],
            })?;
        Self::new(vec![value; needed], width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the value at column `x`, row `y` if in bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&[f32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Returns the backing buffer.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Applies `f` to every element in place.
    pub fn map_in_place(&mut self, f: impl Fn(f32) -> f32) {
        for value in self.data.iter_mut() {
            *value = f(*value);
        }
    }
}
