//! Environment Queries
//!
//! Read-mostly view of the level used by buoyancy and terrain handling.
//! [`HullMap`] is the in-crate implementation; a game can implement
//! [`Environment`] over its own level representation.

pub mod hull;
pub mod structure;

use std::collections::BTreeMap;

use glam::Vec2;
use tracing::debug;

pub use hull::{Gap, Hull, HullId};
pub use structure::{StairDirection, Structure};

/// Environment lookups needed by the ragdoll core.
pub trait Environment {
    /// Hull containing `position`. `hint` is checked first.
    fn find_hull(&self, position: Vec2, hint: Option<HullId>) -> Option<HullId>;

    /// Look up a hull.
    fn hull(&self, id: HullId) -> Option<&Hull>;

    /// All flow-producing openings.
    fn gaps(&self) -> &[Gap];

    /// Set the vertical velocity of one surface wave column.
    fn perturb_wave(&mut self, id: HullId, column: usize, velocity: f32);
}

/// Hulls and gaps kept in sorted maps.
#[derive(Clone, Debug, Default)]
pub struct HullMap {
    hulls: BTreeMap<HullId, Hull>,
    gaps: Vec<Gap>,
}

impl HullMap {
    /// Create an empty map (open water everywhere).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a hull.
    pub fn insert_hull(&mut self, hull: Hull) {
        self.hulls.insert(hull.id, hull);
    }

    /// Add a gap.
    pub fn add_gap(&mut self, gap: Gap) {
        self.gaps.push(gap);
    }

    /// Mutable access to a hull.
    pub fn hull_mut(&mut self, id: HullId) -> Option<&mut Hull> {
        self.hulls.get_mut(&id)
    }

    /// Mutable access to the gaps.
    pub fn gaps_mut(&mut self) -> &mut [Gap] {
        &mut self.gaps
    }
}

impl Environment for HullMap {
    fn find_hull(&self, position: Vec2, hint: Option<HullId>) -> Option<HullId> {
        if let Some(hint) = hint {
            if self.hulls.get(&hint).is_some_and(|h| h.rect.contains(position)) {
                return Some(hint);
            }
        }
        self.hulls
            .values()
            .find(|h| h.rect.contains(position))
            .map(|h| h.id)
    }

    fn hull(&self, id: HullId) -> Option<&Hull> {
        self.hulls.get(&id)
    }

    fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    fn perturb_wave(&mut self, id: HullId, column: usize, velocity: f32) {
        let Some(hull) = self.hulls.get_mut(&id) else {
            return;
        };
        match hull.wave_velocity.get_mut(column) {
            Some(wave) => *wave = velocity,
            None => debug!("wave column {} outside hull {:?}", column, id),
        }
    }
}
