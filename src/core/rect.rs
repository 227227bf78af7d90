//! Axis-Aligned Rectangles
//!
//! Player, platform and enemy bounds. All collision in the core is AABB
//! overlap plus radius checks; there is no rotation.

use serde::{Deserialize, Serialize};

use super::vec2::Vec2;

/// Axis-aligned rectangle. `x`/`y` is the top-left corner (+Y is down).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width (non-negative)
    pub w: f32,
    /// Height (non-negative)
    pub h: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle centered on a point.
    #[inline]
    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self {
            x: center.x - w / 2.0,
            y: center.y - h / 2.0,
            w,
            h,
        }
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Whether this rectangle overlaps another (strict, edges touching do
    /// not count).
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Whether a point lies inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Horizontal span overlap with another rectangle.
    #[inline]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x
    }

    /// Copy shifted by an offset.
    #[inline]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            w: self.w,
            h: self.h,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Vec2::new(25.0, 40.0));
    }

    #[test]
    fn test_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 0.0, 5.0, 5.0);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));

        // Touching edges do not overlap
        let d = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_contains() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Vec2::new(5.0, 5.0)));
        assert!(r.contains(Vec2::new(0.0, 10.0)));
        assert!(!r.contains(Vec2::new(-0.1, 5.0)));
    }

    #[test]
    fn test_from_center() {
        let r = Rect::from_center(Vec2::new(5.0, 5.0), 4.0, 6.0);
        assert_eq!(r, Rect::new(3.0, 2.0, 4.0, 6.0));
    }
}
