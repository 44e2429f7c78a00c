//! Axis-aligned overlap tests for the catch game
//!
//! Screen space: x grows right, y grows down. Rectangles are closed, so two
//! boxes that merely touch along an edge still count as overlapping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box of the given size whose top edge is centered on `top_center`
    pub fn from_top_center(top_center: Vec2, size: Vec2) -> Self {
        let min = Vec2::new(top_center.x - size.x / 2.0, top_center.y);
        Self::new(min, min + size)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Point containment (edges inclusive)
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Overlap test (edges inclusive)
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Rect {
        Rect::new(Vec2::new(x0, y0), Vec2::new(x1, y1))
    }

    #[test]
    fn test_overlap_inside() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_edges_overlap() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(10.0, 0.0, 20.0, 10.0);
        assert!(a.overlaps(&b));
    }

    #[test]
    fn test_separated_miss() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&rect(10.5, 0.0, 20.0, 10.0)));
        assert!(!a.overlaps(&rect(0.0, -20.0, 10.0, -0.5)));
    }

    #[test]
    fn test_from_top_center() {
        let r = Rect::from_top_center(Vec2::new(50.0, 10.0), Vec2::new(30.0, 30.0));
        assert_eq!(r.min, Vec2::new(35.0, 10.0));
        assert_eq!(r.max, Vec2::new(65.0, 40.0));
        assert!(r.contains(Vec2::new(50.0, 25.0)));
        assert!(!r.contains(Vec2::new(50.0, 41.0)));
    }
}
