//! Limbs
//!
//! A limb mirrors the state of its engine body. Writes made by the core
//! (reconciliation snaps, buoyancy forces) land on the mirror first and are
//! flushed to the engine by the owning ragdoll.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::{BodyHandle, BodyState, Shape};
use crate::ragdoll::definition::LimbDescriptor;

/// Dense 0-based limb identifier, stable for the ragdoll's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LimbId(pub usize);

/// Semantic limb type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LimbType {
    /// Head
    Head,
    /// Torso
    Torso,
    /// Waist
    Waist,
    /// Left arm
    LeftArm,
    /// Right arm
    RightArm,
    /// Left hand
    LeftHand,
    /// Right hand
    RightHand,
    /// Left leg
    LeftLeg,
    /// Right leg
    RightLeg,
    /// Left foot
    LeftFoot,
    /// Right foot
    RightFoot,
    /// Tail
    Tail,
    /// Anything else
    #[serde(other)]
    Other,
}

impl LimbType {
    /// Whether this limb type stands on stairs.
    #[inline]
    pub fn is_foot(self) -> bool {
        matches!(self, LimbType::LeftFoot | LimbType::RightFoot)
    }
}

/// Authoritative state received for a limb.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct LimbTarget {
    /// Target position
    pub position: Vec2,
    /// Target rotation (radians)
    pub rotation: f32,
    /// Target linear velocity
    pub linear_velocity: Vec2,
    /// Target angular velocity
    pub angular_velocity: f32,
}

impl LimbTarget {
    /// Target from an engine state.
    pub fn from_state(state: &BodyState) -> Self {
        Self {
            position: state.position,
            rotation: state.rotation,
            linear_velocity: state.linear_velocity,
            angular_velocity: state.angular_velocity,
        }
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.rotation.is_finite()
            && self.linear_velocity.is_finite()
            && self.angular_velocity.is_finite()
    }
}

/// A single rigid segment of a ragdoll.
#[derive(Clone, Debug)]
pub struct Limb {
    /// Stable identifier
    pub id: LimbId,
    /// Semantic type
    pub limb_type: LimbType,
    /// Mass
    pub mass: f32,
    /// Collision shape
    pub shape: Shape,
    /// Impact speed absorbed without damage
    pub impact_tolerance: f32,
    /// Limb never collides
    pub ignore_collisions: bool,
    /// Below a fluid surface
    pub in_water: bool,
    /// Facing sign (-1 left, 1 right)
    pub dir: f32,
    /// Pull-target anchor in the limb's local frame, if active
    pub pull_anchor: Option<Vec2>,
    /// Sprite draw depth
    pub draw_depth: f32,
    /// Sprite origin
    pub sprite_origin: Vec2,
    /// Sprite source width
    pub sprite_width: f32,

    pub(crate) body: BodyHandle,
    state: BodyState,
    target: Option<LimbTarget>,
    sound_cooldown: f32,
    pending_force: Vec2,
    transform_dirty: bool,
    velocity_dirty: bool,
}

impl Limb {
    /// Create a limb mirroring a freshly created body.
    pub(crate) fn new(desc: &LimbDescriptor, body: BodyHandle, position: Vec2, start_depth: f32) -> Self {
        Self {
            id: LimbId(desc.id),
            limb_type: desc.limb_type,
            mass: desc.mass,
            shape: desc.shape,
            impact_tolerance: desc.impact_tolerance,
            ignore_collisions: desc.ignore_collisions,
            in_water: false,
            dir: 1.0,
            pull_anchor: None,
            draw_depth: start_depth + desc.depth * 0.0001,
            sprite_origin: desc.sprite_origin,
            sprite_width: desc.sprite_width,
            body,
            state: BodyState { position, ..BodyState::default() },
            target: None,
            sound_cooldown: 0.0,
            pending_force: Vec2::ZERO,
            transform_dirty: false,
            velocity_dirty: false,
        }
    }

    /// Engine handle of the limb's body.
    #[inline]
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Mirrored body state.
    #[inline]
    pub fn state(&self) -> &BodyState {
        &self.state
    }

    /// Position.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.state.position
    }

    /// Rotation (radians).
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.state.rotation
    }

    /// Linear velocity.
    #[inline]
    pub fn linear_velocity(&self) -> Vec2 {
        self.state.linear_velocity
    }

    /// Pending authoritative target.
    #[inline]
    pub fn target(&self) -> Option<&LimbTarget> {
        self.target.as_ref()
    }

    /// Whether a target is pending.
    #[inline]
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Set the pending target.
    pub fn set_target(&mut self, target: LimbTarget) {
        self.target = Some(target);
    }

    /// Drop the pending target.
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Teleport the limb; flushed to the engine later.
    pub fn set_transform(&mut self, position: Vec2, rotation: f32) {
        self.state.position = position;
        self.state.rotation = rotation;
        self.transform_dirty = true;
    }

    /// Overwrite velocities; flushed to the engine later.
    pub fn set_velocity(&mut self, linear: Vec2, angular: f32) {
        self.state.linear_velocity = linear;
        self.state.angular_velocity = angular;
        self.velocity_dirty = true;
    }

    /// Accumulate a force for the next engine step.
    pub fn add_force(&mut self, force: Vec2) {
        self.pending_force += force;
    }

    /// Force accumulated since the last flush.
    #[inline]
    pub fn pending_force(&self) -> Vec2 {
        self.pending_force
    }

    /// Whether the hit sound may play again.
    #[inline]
    pub fn sound_ready(&self) -> bool {
        self.sound_cooldown <= 0.0
    }

    pub(crate) fn start_sound_cooldown(&mut self, seconds: f32) {
        self.sound_cooldown = seconds;
    }

    /// Per-tick bookkeeping.
    pub(crate) fn update(&mut self, dt: f32) {
        if self.sound_cooldown > 0.0 {
            self.sound_cooldown = (self.sound_cooldown - dt).max(0.0);
        }
    }

    /// Replace the mirror with the engine's state.
    pub(crate) fn sync(&mut self, state: BodyState) {
        self.state = state;
        self.transform_dirty = false;
        self.velocity_dirty = false;
    }

    /// Take the writes that still have to reach the engine.
    pub(crate) fn take_pending(&mut self) -> PendingWrites {
        let writes = PendingWrites {
            transform: self.transform_dirty.then_some((self.state.position, self.state.rotation)),
            velocity: self
                .velocity_dirty
                .then_some((self.state.linear_velocity, self.state.angular_velocity)),
            force: (self.pending_force != Vec2::ZERO).then_some(self.pending_force),
        };
        self.transform_dirty = false;
        self.velocity_dirty = false;
        self.pending_force = Vec2::ZERO;
        writes
    }
}

/// Mirror writes waiting to be pushed to the engine.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct PendingWrites {
    pub transform: Option<(Vec2, f32)>,
    pub velocity: Option<(Vec2, f32)>,
    pub force: Option<Vec2>,
}
