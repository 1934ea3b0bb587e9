//! Static Structures
//!
//! Terrain metadata read by the contact classifier. Structures are owned by
//! the level; the ragdoll only ever sees copies.

use serde::{Deserialize, Serialize};

use crate::core::math::Rect;

/// Direction a staircase ascends toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StairDirection {
    /// Ascends to the left
    Left,
    /// Ascends to the right
    Right,
}

/// Static geometry with terrain flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Level-unique identifier
    pub id: u32,
    /// Bounds
    pub rect: Rect,
    /// One-way platform
    pub is_platform: bool,
    /// Staircase direction, if this is a staircase
    pub stair_direction: Option<StairDirection>,
}

impl Structure {
    /// Plain solid structure (wall, floor).
    pub fn solid(id: u32, rect: Rect) -> Self {
        Self { id, rect, is_platform: false, stair_direction: None }
    }

    /// One-way platform.
    pub fn platform(id: u32, rect: Rect) -> Self {
        Self { id, rect, is_platform: true, stair_direction: None }
    }

    /// Staircase.
    pub fn stairs(id: u32, rect: Rect, direction: StairDirection) -> Self {
        Self { id, rect, is_platform: false, stair_direction: Some(direction) }
    }

    /// Whether this is a staircase.
    #[inline]
    pub fn is_stairs(&self) -> bool {
        self.stair_direction.is_some()
    }
}
