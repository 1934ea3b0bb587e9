//! Vector Helpers and Geometry
//!
//! Small helpers on top of `glam::Vec2` used throughout the simulation,
//! plus the axis-aligned [`Rect`] shared by hulls and structures.
//!
//! ## Coordinate System
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Simulation units, Y axis pointing up                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │   (x, y) ──────────── width ───────────┐                    │
//! │     │  top-left corner                 │                    │
//! │   height                               │                    │
//! │     │                                  │                    │
//! │     └──────────────────────────────────┘ (x + w, y - h)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Clamp both components to `[-limit, limit]`.
#[inline]
pub fn clamp_components(v: Vec2, limit: f32) -> Vec2 {
    Vec2::new(v.x.clamp(-limit, limit), v.y.clamp(-limit, limit))
}

/// Mirror a vector across the vertical axis.
#[inline]
pub fn mirror_x(v: Vec2) -> Vec2 {
    Vec2::new(-v.x, v.y)
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width (extends right)
    pub width: f32,
    /// Height (extends down)
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Top edge.
    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y - self.height
    }

    /// Left edge.
    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Area of the rectangle.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Check whether a point lies inside (edges inclusive).
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y <= self.top() && p.y >= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_components() {
        let v = clamp_components(Vec2::new(5.0, -7.0), 3.0);
        assert_eq!(v, Vec2::new(3.0, -3.0));
    }

    #[test]
    fn test_rect_edges_and_contains() {
        let rect = Rect::new(-1.0, 2.0, 4.0, 3.0);
        assert_eq!(rect.bottom(), -1.0);
        assert_eq!(rect.right(), 3.0);

        assert!(rect.contains(Vec2::new(0.0, 0.0)));
        assert!(rect.contains(Vec2::new(3.0, -1.0)));
        assert!(!rect.contains(Vec2::new(0.0, 2.5)));
        assert!(!rect.contains(Vec2::new(-1.5, 0.0)));
    }
}
