//! Ragdoll Definitions
//!
//! Declarative limb and joint descriptors a ragdoll is assembled from.
//! Angles are given in degrees; the assembly converts them to radians.
//!
//! ```json
//! {
//!   "limbs": [
//!     { "id": 0, "type": "Torso", "mass": 10.0, "shape": { "kind": "rect", "width": 0.3, "height": 0.6 } },
//!     { "id": 1, "type": "Head",  "mass": 4.0,  "shape": { "kind": "circle", "radius": 0.15 } }
//!   ],
//!   "joints": [
//!     { "limb1": 0, "limb2": 1, "anchor1": [0.0, 0.35], "anchor2": [0.0, -0.1],
//!       "lower_limit": -30.0, "upper_limit": 30.0 }
//!   ]
//! }
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::error::DefinitionError;
use crate::physics::Shape;
use crate::ragdoll::limb::LimbType;

/// Impact tolerance used when a descriptor leaves it out.
pub const DEFAULT_IMPACT_TOLERANCE: f32 = 8.0;

fn default_impact_tolerance() -> f32 {
    DEFAULT_IMPACT_TOLERANCE
}

/// One limb of a definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LimbDescriptor {
    /// Declared index (becomes the limb ID)
    pub id: usize,
    /// Semantic type
    #[serde(rename = "type")]
    pub limb_type: LimbType,
    /// Mass
    pub mass: f32,
    /// Collision shape
    pub shape: Shape,
    /// Impact speed the limb absorbs without damage
    #[serde(default = "default_impact_tolerance")]
    pub impact_tolerance: f32,
    /// Limb never collides with anything
    #[serde(default)]
    pub ignore_collisions: bool,
    /// Relative draw depth of the limb sprite
    #[serde(default)]
    pub depth: f32,
    /// Sprite source width
    #[serde(default)]
    pub sprite_width: f32,
    /// Sprite origin inside the source rectangle
    #[serde(default)]
    pub sprite_origin: Vec2,
}

impl LimbDescriptor {
    /// Descriptor with default tolerance and presentation fields.
    pub fn new(id: usize, limb_type: LimbType, mass: f32, shape: Shape) -> Self {
        Self {
            id,
            limb_type,
            mass,
            shape,
            impact_tolerance: DEFAULT_IMPACT_TOLERANCE,
            ignore_collisions: false,
            depth: 0.0,
            sprite_width: 0.0,
            sprite_origin: Vec2::ZERO,
        }
    }
}

/// One joint of a definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointDescriptor {
    /// First limb index
    pub limb1: usize,
    /// Second limb index
    pub limb2: usize,
    /// Anchor in the first limb's local frame
    #[serde(default)]
    pub anchor1: Vec2,
    /// Anchor in the second limb's local frame
    #[serde(default)]
    pub anchor2: Vec2,
    /// Lower angle limit in degrees
    #[serde(default)]
    pub lower_limit: Option<f32>,
    /// Upper angle limit in degrees
    #[serde(default)]
    pub upper_limit: Option<f32>,
}

impl JointDescriptor {
    /// Joint without limits.
    pub fn new(limb1: usize, limb2: usize, anchor1: Vec2, anchor2: Vec2) -> Self {
        Self { limb1, limb2, anchor1, anchor2, lower_limit: None, upper_limit: None }
    }

    /// Add limits in degrees.
    pub fn with_limits(mut self, lower: f32, upper: f32) -> Self {
        self.lower_limit = Some(lower);
        self.upper_limit = Some(upper);
        self
    }
}

/// Complete ragdoll definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RagdollDefinition {
    /// Limb descriptors
    pub limbs: Vec<LimbDescriptor>,
    /// Joint descriptors
    #[serde(default)]
    pub joints: Vec<JointDescriptor>,
}

impl RagdollDefinition {
    /// Decode a definition from JSON.
    pub fn from_json(s: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Encode the definition as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
