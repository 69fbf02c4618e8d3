//! Mask export and overlay painting through the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use std::collections::BTreeMap;
use std::path::Path;

use image::{GrayImage, Rgb, RgbImage};

use crate::mask::InstanceMask;
use crate::util::{DecodeError, DecodeResult};

impl InstanceMask {
    /// Renders the mask as an 8-bit image: set pixels are 255, others 0.
    pub fn to_gray_image(&self) -> DecodeResult<GrayImage> {
        let width = u32::try_from(self.width()).map_err(|_| image_err("mask too wide"))?;
        let height = u32::try_from(self.height()).map_err(|_| image_err("mask too tall"))?;
        let data = self
            .as_slice()
            .iter()
            .map(|&set| if set { 255 } else { 0 })
            .collect();
        GrayImage::from_raw(width, height, data)
            .ok_or_else(|| image_err("mask buffer does not match its dimensions"))
    }
}

fn image_err(reason: impl Into<String>) -> DecodeError {
    DecodeError::ImageIo {
        reason: reason.into(),
    }
}

/// Writes `mask` to `path`; the format follows the file extension.
pub fn save_mask<P: AsRef<Path>>(mask: &InstanceMask, path: P) -> DecodeResult<()> {
    mask.to_gray_image()?
        .save(path)
        .map_err(|err| image_err(err.to_string()))
}

/// Paints every set pixel of `mask` onto `canvas` with `color`.
///
/// Pixels outside either image are skipped, so a mask rendered for a
/// different size only covers the overlapping region.
pub fn paint_mask(canvas: &mut RgbImage, mask: &InstanceMask, color: Rgb<u8>) {
    let width = (canvas.width() as usize).min(mask.width());
    let height = (canvas.height() as usize).min(mask.height());
    for y in 0..height {
        let Some(row) = mask.row(y) else {
            continue;
        };
        for (x, &set) in row[..width].iter().enumerate() {
            if set {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Class id -> overlay colour, assigned on first use.
///
/// Colours are drawn from a seeded generator, so the same seed and the same
/// sequence of class ids always give the same palette.
#[derive(Clone, Debug)]
pub struct ClassColors {
    seed: u64,
    colors: BTreeMap<usize, Rgb<u8>>,
}

impl ClassColors {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            colors: BTreeMap::new(),
        }
    }

    /// Returns the colour for `class_id`, assigning one if needed.
    pub fn color_for(&mut self, class_id: usize) -> Rgb<u8> {
        let seed = self.seed;
        *self
            .colors
            .entry(class_id)
            .or_insert_with(|| color_from_seed(seed, class_id))
    }

    /// Overrides the colour of `class_id`.
    pub fn insert(&mut self, class_id: usize, color: Rgb<u8>) {
        self.colors.insert(class_id, color);
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for ClassColors {
    fn default() -> Self {
        Self::new(0)
    }
}

// splitmix64 over (seed, class_id).
fn color_from_seed(seed: u64, class_id: usize) -> Rgb<u8> {
    let mut z = seed
        .wrapping_add((class_id as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    let bytes = z.to_le_bytes();
    Rgb([bytes[0], bytes[1], bytes[2]])
}

#[cfg(test)]
mod tests {
    use super::{paint_mask, ClassColors};
    use crate::mask::InstanceMask;
    use image::{Rgb, RgbImage};

    #[test]
    fn gray_image_marks_set_pixels() {
        let mut mask = InstanceMask::empty(3, 2);
        mask.set(1, 1, true);
        let img = mask.to_gray_image().unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(1, 1).0, [255]);
        assert_eq!(img.get_pixel(0, 0).0, [0]);
    }

    #[test]
    fn paint_skips_out_of_canvas_pixels() {
        let mut mask = InstanceMask::empty(4, 4);
        mask.set(0, 0, true);
        mask.set(3, 3, true);
        let mut canvas = RgbImage::new(2, 2);
        paint_mask(&mut canvas, &mask, Rgb([255, 0, 0]));
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 0]);
    }

    #[test]
    fn colors_are_stable_per_seed() {
        let mut a = ClassColors::new(7);
        let mut b = ClassColors::new(7);
        assert_eq!(a.color_for(3), b.color_for(3));
        assert_eq!(a.color_for(3), a.color_for(3));
        assert_eq!(a.len(), 1);

        a.insert(5, Rgb([1, 2, 3]));
        assert_eq!(a.color_for(5), Rgb([1, 2, 3]));
    }
}
