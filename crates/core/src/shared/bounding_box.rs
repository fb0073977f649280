use serde::{Deserialize, Serialize};

use crate::shared::error::{DentalError, Result};

/// Axis-aligned detector box in pixel coordinates of the decoded radiograph.
///
/// Construction validates `x1 < x2` and `y1 < y2`, so every value that exists
/// has positive width and height. Serialized as `[x1, y1, x2, y2]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        let finite = [x1, y1, x2, y2].iter().all(|v| v.is_finite());
        if !finite || x1 >= x2 || y1 >= y2 {
            return Err(DentalError::InvalidBox { x1, y1, x2, y2 });
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    pub fn x1(&self) -> f64 {
        self.x1
    }

    pub fn y1(&self) -> f64 {
        self.y1
    }

    pub fn x2(&self) -> f64 {
        self.x2
    }

    pub fn y2(&self) -> f64 {
        self.y2
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Box center as `(cx, cy)`.
    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        overlaps(self, other)
    }

    pub fn iou(&self, other: &BoundingBox) -> f64 {
        iou(self, other)
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = DentalError;

    fn try_from(v: [f64; 4]) -> Result<Self> {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// True when the projections intersect on both axes. Edges are inclusive,
/// so boxes that merely touch count as overlapping.
pub fn overlaps(a: &BoundingBox, b: &BoundingBox) -> bool {
    !(a.x2 < b.x1 || a.x1 > b.x2 || a.y2 < b.y1 || a.y1 > b.y2)
}

/// Intersection over union in `[0, 1]`. Returns 0 when the union is empty.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let iw = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let ih = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let inter = iw * ih;
    if inter == 0.0 {
        return 0.0;
    }

    let union = a.area() + b.area() - inter;
    if union <= 0.0 {
        return 0.0;
    }
    inter / union
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn bbox(x1: f64, y1: f64, x2: f64, y2: f64) -> BoundingBox {
        BoundingBox::new(x1, y1, x2, y2).unwrap()
    }

    // ── Construction ─────────────────────────────────────────────────

    #[rstest]
    #[case::zero_width(10.0, 0.0, 10.0, 50.0)]
    #[case::zero_height(0.0, 10.0, 50.0, 10.0)]
    #[case::inverted_x(50.0, 0.0, 10.0, 50.0)]
    #[case::inverted_y(0.0, 50.0, 50.0, 10.0)]
    #[case::nan(f64::NAN, 0.0, 10.0, 10.0)]
    #[case::infinite(0.0, 0.0, f64::INFINITY, 10.0)]
    fn test_new_rejects_malformed(
        #[case] x1: f64,
        #[case] y1: f64,
        #[case] x2: f64,
        #[case] y2: f64,
    ) {
        let err = BoundingBox::new(x1, y1, x2, y2).unwrap_err();
        assert!(matches!(err, DentalError::InvalidBox { .. }));
    }

    #[test]
    fn test_extent_helpers() {
        let b = bbox(10.0, 20.0, 50.0, 100.0);
        assert_relative_eq!(b.width(), 40.0);
        assert_relative_eq!(b.height(), 80.0);
        assert_relative_eq!(b.area(), 3200.0);
        assert_eq!(b.center(), (30.0, 60.0));
    }

    #[test]
    fn test_deserialize_rejects_inverted_box() {
        let result: std::result::Result<BoundingBox, _> =
            serde_json::from_str("[100.0, 0.0, 10.0, 10.0]");
        assert!(result.is_err());
    }

    #[test]
    fn test_serializes_as_array() {
        let json = serde_json::to_string(&bbox(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");
    }

    // ── Overlap ──────────────────────────────────────────────────────

    #[test]
    fn test_overlaps_partial() {
        assert!(overlaps(&bbox(0.0, 0.0, 50.0, 50.0), &bbox(25.0, 25.0, 75.0, 75.0)));
    }

    #[test]
    fn test_overlaps_touching_edges_is_inclusive() {
        assert!(overlaps(&bbox(0.0, 0.0, 50.0, 50.0), &bbox(50.0, 0.0, 100.0, 50.0)));
    }

    #[rstest]
    #[case::right(bbox(51.0, 0.0, 100.0, 50.0))]
    #[case::left(bbox(-100.0, 0.0, -1.0, 50.0))]
    #[case::below(bbox(0.0, 51.0, 50.0, 100.0))]
    #[case::above(bbox(0.0, -100.0, 50.0, -1.0))]
    fn test_overlaps_disjoint(#[case] other: BoundingBox) {
        let a = bbox(0.0, 0.0, 50.0, 50.0);
        assert!(!overlaps(&a, &other));
        assert!(!overlaps(&other, &a));
    }

    // ── IoU ──────────────────────────────────────────────────────────

    #[test]
    fn test_iou_identical_boxes() {
        let a = bbox(10.0, 10.0, 110.0, 110.0);
        assert_relative_eq!(iou(&a, &a), 1.0);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = bbox(0.0, 0.0, 50.0, 50.0);
        let b = bbox(100.0, 100.0, 150.0, 150.0);
        assert_relative_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        // intersection: [50,0]-[100,100] = 5000, union = 15000
        let a = bbox(0.0, 0.0, 100.0, 100.0);
        let b = bbox(50.0, 0.0, 150.0, 100.0);
        assert_relative_eq!(iou(&a, &b), 5000.0 / 15000.0);
    }

    #[test]
    fn test_iou_contained() {
        let a = bbox(0.0, 0.0, 100.0, 100.0);
        let b = bbox(25.0, 25.0, 75.0, 75.0);
        assert_relative_eq!(iou(&a, &b), 2500.0 / 10000.0);
    }

    #[test]
    fn test_iou_touching_edges_is_zero() {
        let a = bbox(0.0, 0.0, 50.0, 50.0);
        let b = bbox(50.0, 0.0, 100.0, 50.0);
        assert_relative_eq!(iou(&a, &b), 0.0);
    }

    #[rstest]
    #[case(bbox(0.0, 0.0, 100.0, 100.0), bbox(50.0, 0.0, 150.0, 100.0))]
    #[case(bbox(3.0, 7.0, 40.0, 90.0), bbox(20.0, 1.0, 35.0, 60.0))]
    #[case(bbox(0.0, 0.0, 10.0, 10.0), bbox(200.0, 200.0, 210.0, 210.0))]
    fn test_iou_symmetric(#[case] a: BoundingBox, #[case] b: BoundingBox) {
        assert_relative_eq!(iou(&a, &b), iou(&b, &a));
        assert!((0.0..=1.0).contains(&iou(&a, &b)));
    }

    #[test]
    fn test_methods_delegate_to_free_functions() {
        let a = bbox(0.0, 0.0, 100.0, 100.0);
        let b = bbox(50.0, 0.0, 150.0, 100.0);
        assert_relative_eq!(a.iou(&b), iou(&a, &b));
        assert_eq!(a.overlaps(&b), overlaps(&a, &b));
    }
}
