//! Half-open integer rectangles
//!
//! Every box in the layer (sprite positions, slices, the viewport) is a
//! [`Rect`] covering `[left, right) x [top, bottom)`.

use serde::{Deserialize, Serialize};

/// Axis-aligned half-open box in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// The canonical empty box.
    pub const EMPTY: Rect = Rect { left: 0, top: 0, right: 0, bottom: 0 };

    /// Create a box from its four edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Create a box from an origin and a size.
    pub fn from_xywh(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            left: x,
            top: y,
            right: x.saturating_add(clamp_extent(width)),
            bottom: y.saturating_add(clamp_extent(height)),
        }
    }

    pub fn width(&self) -> u32 {
        (i64::from(self.right) - i64::from(self.left)).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (i64::from(self.bottom) - i64::from(self.top)).max(0) as u32
    }

    /// True when the box covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Half-open overlap test. Empty boxes overlap nothing.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.right > other.left
            && self.bottom > other.top
            && self.left < other.right
            && self.top < other.bottom
    }

    /// Intersection of two boxes, or [`Rect::EMPTY`] when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let r = Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        if r.is_empty() {
            Rect::EMPTY
        } else {
            r
        }
    }

    /// Same box in coordinates whose origin is `(x, y)`, saturating at the
    /// `i32` range.
    pub fn relative_to(&self, x: i32, y: i32) -> Rect {
        let rel = |v: i32, o: i32| clamp_coord(i64::from(v) - i64::from(o));
        Rect {
            left: rel(self.left, x),
            top: rel(self.top, y),
            right: rel(self.right, x),
            bottom: rel(self.bottom, y),
        }
    }
}

fn clamp_coord(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn clamp_extent(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_to_extreme_origin() {
        let r = Rect::from_xywh(i32::MIN, 0, 2, 2);
        assert_eq!(r.relative_to(i32::MIN, 0), Rect::new(0, 0, 2, 2));
        let far = Rect::new(i32::MAX - 1, 0, i32::MAX, 1);
        assert_eq!(far.relative_to(i32::MIN, 0).left, i32::MAX);
    }

    #[test]
    fn test_from_xywh() {
        let r = Rect::from_xywh(2, 3, 4, 5);
        assert_eq!(r, Rect::new(2, 3, 6, 8));
        assert_eq!(r.width(), 4);
        assert_eq!(r.height(), 5);
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = Rect::new(0, 0, 16, 16);
        // Touching edges do not overlap
        assert!(!a.overlaps(&Rect::new(16, 0, 32, 16)));
        assert!(!a.overlaps(&Rect::new(0, 16, 16, 32)));
        assert!(a.overlaps(&Rect::new(15, 15, 32, 32)));
        assert!(a.overlaps(&Rect::new(-5, -5, 1, 1)));
    }

    #[test]
    fn test_empty_overlaps_nothing() {
        let empty = Rect::new(4, 4, 4, 10);
        assert!(empty.is_empty());
        assert!(!empty.overlaps(&Rect::new(0, 0, 100, 100)));
        assert!(!Rect::new(0, 0, 100, 100).overlaps(&empty));
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, -3, 20, 4);
        assert_eq!(a.intersect(&b), Rect::new(5, 0, 10, 4));
        assert_eq!(a.intersect(&Rect::new(20, 20, 30, 30)), Rect::EMPTY);
    }

    #[test]
    fn test_inverted_box_has_zero_size() {
        let r = Rect::new(10, 10, 2, 2);
        assert_eq!(r.width(), 0);
        assert_eq!(r.height(), 0);
        assert!(r.is_empty());
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(Rect::new(1, 2, 3, 4).relative_to(-10, 2), Rect::new(11, 0, 13, 2));
    }
}
