//! Box cropping and thresholding of upsampled mask grids.

use crate::geometry::BoundingBox;
use crate::mask::grid::ScoreGrid;
use crate::mask::InstanceMask;
use crate::util::math::trunc_clamp;

/// Pixel range `[x1, x2) x [y1, y2)` covered by `bbox` inside a
/// `width` x `height` image.
///
/// Corners are truncated toward zero and clamped to the image extent.
/// Inverted boxes produce an empty range.
pub fn pixel_span(bbox: &BoundingBox, width: usize, height: usize) -> (usize, usize, usize, usize) {
    (
        trunc_clamp(bbox.x1, width),
        trunc_clamp(bbox.y1, height),
        trunc_clamp(bbox.x2, width),
        trunc_clamp(bbox.y2, height),
    )
}

/// Marks pixels inside `bbox` whose value is `>= threshold`.
///
/// `bbox` is in the grid's pixel coordinates. The mask spans the whole grid;
/// everything outside the box stays false.
pub fn crop_threshold(grid: &ScoreGrid, bbox: &BoundingBox, threshold: f32) -> InstanceMask {
    let width = grid.width();
    let height = grid.height();
    let mut mask = InstanceMask::empty(width, height);
    let (x1, y1, x2, y2) = pixel_span(bbox, width, height);

    for y in y1..y2 {
        let Some(row) = grid.row(y) else { break };
        for x in x1..x2 {
            if row[x] >= threshold {
                mask.set(x, y, true);
            }
        }
    }
    mask
}
