//! Box and keypoint geometry plus intersection-over-union.
//!
//! Coordinates are model-input pixels with a top-left origin. Boxes are not
//! normalized on construction: inverted or zero-area boxes coming straight
//! from the network are carried through unchanged.

/// Axis-aligned box in corner form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

impl BoundingBox {
    /// Creates a box from its corners.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Converts a `(center_x, center_y, width, height)` box to corner form.
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Self {
            x1: cx - half_w,
            y1: cy - half_h,
            x2: cx + half_w,
            y2: cy + half_h,
        }
    }

    /// Box width; negative for inverted boxes.
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Box height; negative for inverted boxes.
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Unclamped area `width * height`.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Scales both axes independently, e.g. from model-input to image pixels.
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self {
            x1: self.x1 * sx,
            y1: self.y1 * sy,
            x2: self.x2 * sx,
            y2: self.y2 * sy,
        }
    }
}

/// One skeletal keypoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Visibility confidence as emitted by the model.
    pub visibility: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    /// Scales the position; visibility is left untouched.
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
            visibility: self.visibility,
        }
    }
}

/// Keypoint names of the 17-point COCO layout, in channel order.
pub const COCO_KEYPOINTS: [&str; 17] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

/// Half-open overlap test on one axis.
///
/// Intervals that only share a boundary point do not overlap.
fn axis_overlaps(a1: f32, a2: f32, b1: f32, b2: f32) -> bool {
    (a1 <= b1 && a2 > b1) || (a1 >= b1 && b2 > a1)
}

/// Intersection-over-union of two boxes.
///
/// Identical boxes return exactly `1.0`. Boxes that fail the per-axis overlap
/// test return `0.0`. Areas are not clamped, so degenerate boxes can yield
/// values outside `[0, 1]` or NaN.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    if a.x1 == b.x1 && a.x2 == b.x2 && a.y1 == b.y1 && a.y2 == b.y2 {
        return 1.0;
    }
    if !axis_overlaps(a.x1, a.x2, b.x1, b.x2) || !axis_overlaps(a.y1, a.y2, b.y1, b.y2) {
        return 0.0;
    }
    let inter_w = a.x2.min(b.x2) - a.x1.max(b.x1);
    let inter_h = a.y2.min(b.y2) - a.y1.max(b.y1);
    let intersection = inter_w * inter_h;
    let union = a.area() + b.area() - intersection;
    intersection / union
}

#[cfg(test)]
mod tests {
    use super::{iou, BoundingBox};

    #[test]
    fn from_center_is_exact() {
        let b = BoundingBox::from_center(100.0, 100.0, 20.0, 20.0);
        assert_eq!(b, BoundingBox::new(90.0, 90.0, 110.0, 110.0));
    }

    #[test]
    fn iou_of_half_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 0.0, 15.0, 10.0);
        // 50 / (100 + 100 - 50)
        assert!((iou(&a, &b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn zero_area_identical_boxes_are_one() {
        let a = BoundingBox::new(3.0, 3.0, 3.0, 3.0);
        assert_eq!(iou(&a, &a), 1.0);
    }

    #[test]
    fn contained_box() {
        let outer = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let inner = BoundingBox::new(2.0, 2.0, 4.0, 4.0);
        assert!((iou(&outer, &inner) - 0.04).abs() < 1e-6);
        assert_eq!(iou(&outer, &inner), iou(&inner, &outer));
    }
}
