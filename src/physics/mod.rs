//! Physics Engine Interface
//!
//! The rigid-body engine is an external collaborator. The ragdoll core only
//! talks to it through [`PhysicsEngine`] using opaque handles; the engine
//! never owns ragdoll data. Contacts come back through [`ContactListener`],
//! which decides per contact whether it is resolved.
//!
//! [`SandboxWorld`] is a minimal in-memory implementation used by tests and
//! the demo binary.

pub mod sandbox;

use std::ops::BitOr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;
use crate::environment::Structure;

pub use sandbox::SandboxWorld;

// =============================================================================
// HANDLES
// =============================================================================

/// Opaque engine handle of a rigid body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Opaque engine handle of a joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JointHandle(pub u32);

// =============================================================================
// COLLISION GROUPS
// =============================================================================

/// Collision category bit set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionGroups(pub u32);

impl CollisionGroups {
    /// Nothing
    pub const NONE: Self = Self(0);
    /// Level geometry outside every hull
    pub const LEVEL: Self = Self(1 << 0);
    /// Hull walls
    pub const WALL: Self = Self(1 << 1);
    /// Projectiles
    pub const PROJECTILE: Self = Self(1 << 2);
    /// One-way platforms
    pub const PLATFORM: Self = Self(1 << 3);
    /// Staircases
    pub const STAIRS: Self = Self(1 << 4);
    /// Character limbs
    pub const CHARACTER: Self = Self(1 << 5);
    /// Everything
    pub const ALL: Self = Self(u32::MAX);

    /// Check whether every bit of `other` is set.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CollisionGroups {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// =============================================================================
// DESCRIPTIONS
// =============================================================================

/// Collision shape of a body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Circle
    Circle {
        /// Radius
        radius: f32,
    },
    /// Box
    Rect {
        /// Width
        width: f32,
        /// Height
        height: f32,
    },
    /// Capsule aligned with the body's local Y axis
    Capsule {
        /// Cap radius
        radius: f32,
        /// Length of the straight section
        height: f32,
    },
}

/// Parameters for creating a dynamic body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDesc {
    /// Initial position
    pub position: Vec2,
    /// Initial rotation (radians)
    pub rotation: f32,
    /// Mass
    pub mass: f32,
    /// Collision shape
    pub shape: Shape,
    /// Category this body belongs to
    pub category: CollisionGroups,
    /// Categories this body collides with
    pub collides_with: CollisionGroups,
}

/// Parameters for creating a revolute joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevoluteJointDesc {
    /// First body
    pub body_a: BodyHandle,
    /// Second body
    pub body_b: BodyHandle,
    /// Anchor in body A's local frame
    pub anchor_a: Vec2,
    /// Anchor in body B's local frame
    pub anchor_b: Vec2,
    /// Whether the two bodies collide with each other
    pub collide_connected: bool,
    /// Angle limits (radians), if enabled
    pub limits: Option<(f32, f32)>,
    /// Motor enabled
    pub motor_enabled: bool,
    /// Motor torque cap
    pub max_motor_torque: f32,
}

/// Kinematic state of a body as reported by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyState {
    /// Position
    pub position: Vec2,
    /// Rotation (radians)
    pub rotation: f32,
    /// Linear velocity
    pub linear_velocity: Vec2,
    /// Angular velocity
    pub angular_velocity: f32,
}

// =============================================================================
// CONTACTS
// =============================================================================

/// What a body touched.
#[derive(Clone, Debug, PartialEq)]
pub enum ContactTarget {
    /// Static structure with terrain metadata
    Structure(Structure),
    /// Another dynamic body
    Body(BodyHandle),
    /// Level geometry outside every hull
    Level,
}

impl ContactTarget {
    /// Collision category of the touched shape.
    pub fn category(&self) -> CollisionGroups {
        match self {
            ContactTarget::Structure(s) if s.is_platform => CollisionGroups::PLATFORM,
            ContactTarget::Structure(s) if s.stair_direction.is_some() => CollisionGroups::STAIRS,
            ContactTarget::Structure(_) => CollisionGroups::WALL,
            ContactTarget::Body(_) => CollisionGroups::PROJECTILE,
            ContactTarget::Level => CollisionGroups::LEVEL,
        }
    }
}

/// A contact between a body and another shape, reported before resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    /// Body the contact belongs to
    pub body: BodyHandle,
    /// Shape it touched
    pub other: ContactTarget,
    /// Contact normal pointing from `other` toward `body`
    pub normal: Vec2,
}

/// Receives contacts during an engine step.
///
/// Returning `false` rejects the contact (the shapes pass through each
/// other). Listeners get no engine access: bodies and joints cannot be
/// created or removed while a step is running.
pub trait ContactListener {
    /// Decide whether a contact is resolved.
    fn on_contact(&mut self, contact: &Contact) -> bool;
}

/// Listener accepting every contact.
pub struct AcceptAll;

impl ContactListener for AcceptAll {
    fn on_contact(&mut self, _contact: &Contact) -> bool {
        true
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Rigid-body engine operations used by the ragdoll core.
pub trait PhysicsEngine {
    /// Create a dynamic body.
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, EngineError>;

    /// Remove a body.
    fn remove_body(&mut self, body: BodyHandle) -> Result<(), EngineError>;

    /// Create a revolute joint between two bodies.
    fn create_joint(&mut self, desc: &RevoluteJointDesc) -> Result<JointHandle, EngineError>;

    /// Remove a joint.
    fn remove_joint(&mut self, joint: JointHandle) -> Result<(), EngineError>;

    /// Current state of a body.
    fn body_state(&self, body: BodyHandle) -> Option<BodyState>;

    /// Teleport a body.
    fn set_transform(&mut self, body: BodyHandle, position: Vec2, rotation: f32) -> Result<(), EngineError>;

    /// Overwrite a body's velocities.
    fn set_velocity(&mut self, body: BodyHandle, linear: Vec2, angular: f32) -> Result<(), EngineError>;

    /// Accumulate a force for the next step.
    fn apply_force(&mut self, body: BodyHandle, force: Vec2) -> Result<(), EngineError>;

    /// Enable or disable a body.
    fn set_body_enabled(&mut self, body: BodyHandle, enabled: bool) -> Result<(), EngineError>;

    /// Enable or disable a joint.
    fn set_joint_enabled(&mut self, joint: JointHandle, enabled: bool) -> Result<(), EngineError>;

    /// Replace a joint's angle limits.
    fn set_joint_limits(&mut self, joint: JointHandle, limits: Option<(f32, f32)>) -> Result<(), EngineError>;

    /// Replace a joint's local anchors.
    fn set_joint_anchors(&mut self, joint: JointHandle, anchor_a: Vec2, anchor_b: Vec2) -> Result<(), EngineError>;

    /// Replace the categories a body collides with.
    fn set_collides_with(&mut self, body: BodyHandle, groups: CollisionGroups) -> Result<(), EngineError>;

    /// Advance the simulation, reporting contacts to `listener`.
    fn step(&mut self, dt: f32, listener: &mut dyn ContactListener);
}
