//! Hulls and Gaps
//!
//! Enclosed volumes that may hold fluid, and the openings through which
//! fluid flows between them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::math::Rect;

/// Identifier of a hull.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HullId(pub u32);

/// An enclosed volume with a fluid surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hull {
    /// Identifier
    pub id: HullId,
    /// Bounds
    pub rect: Rect,
    /// Fluid volume
    volume: f32,
    /// World height of the fluid surface
    surface: f32,
    /// Vertical velocity of each surface wave column
    pub wave_velocity: Vec<f32>,
}

impl Hull {
    /// Create a dry hull whose surface is split into columns of `wave_width`.
    pub fn new(id: HullId, rect: Rect, wave_width: f32) -> Self {
        let columns = if wave_width > 0.0 {
            (rect.width / wave_width).ceil().max(1.0) as usize
        } else {
            1
        };
        Self {
            id,
            rect,
            volume: 0.0,
            surface: rect.bottom(),
            wave_velocity: vec![0.0; columns],
        }
    }

    /// Volume of fluid the hull can hold.
    #[inline]
    pub fn full_volume(&self) -> f32 {
        self.rect.area()
    }

    /// Current fluid volume.
    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// World height of the fluid surface.
    #[inline]
    pub fn surface(&self) -> f32 {
        self.surface
    }

    /// Set the fluid volume; the surface follows.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, self.full_volume());
        self.surface = if self.rect.width > 0.0 {
            self.rect.bottom() + self.volume / self.rect.width
        } else {
            self.rect.bottom()
        };
    }

    /// Fill the hull up to a fraction of its height.
    pub fn fill_fraction(&mut self, fraction: f32) {
        self.set_volume(self.full_volume() * fraction.clamp(0.0, 1.0));
    }

    /// Whether a point is below the fluid surface.
    #[inline]
    pub fn is_submerged(&self, point: Vec2) -> bool {
        point.y < self.surface
    }
}

/// An opening through which fluid flows into a hull.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    /// Center of the opening
    pub position: Vec2,
    /// Smoothed flow force through the opening
    pub flow_force: Vec2,
    /// Hull the flow is heading into
    pub flow_target: Option<HullId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_follows_volume() {
        let mut hull = Hull::new(HullId(0), Rect::new(0.0, 4.0, 10.0, 4.0), 0.5);
        assert_eq!(hull.surface(), 0.0);
        assert_eq!(hull.wave_velocity.len(), 20);

        hull.fill_fraction(0.5);
        assert_eq!(hull.volume(), 20.0);
        assert_eq!(hull.surface(), 2.0);

        assert!(hull.is_submerged(Vec2::new(1.0, 1.0)));
        assert!(!hull.is_submerged(Vec2::new(1.0, 3.0)));
    }

    #[test]
    fn test_volume_clamped() {
        let mut hull = Hull::new(HullId(0), Rect::new(0.0, 2.0, 2.0, 2.0), 1.0);
        hull.set_volume(100.0);
        assert_eq!(hull.volume(), 4.0);
        assert_eq!(hull.surface(), 2.0);
        hull.set_volume(-1.0);
        assert_eq!(hull.volume(), 0.0);
    }
}
