//! Ragdoll Events
//!
//! Side effects produced by contact handling, buoyancy and reconciliation.
//! The ragdoll only records them; health, audio, camera and particle
//! systems consume them after the tick.

use glam::Vec2;
use serde::{Serialize, Deserialize};

use crate::environment::HullId;
use crate::ragdoll::limb::LimbId;

/// Processing order of events within a tick.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Health changes first
    Damage = 0,
    /// Then state resets
    Reset = 1,
    /// Then fluid effects
    Fluid = 2,
    /// Then audio and camera
    Feedback = 3,
}

/// Particle emitter requested by a ragdoll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Water splash on a surface crossing
    Splash,
    /// Bubbles on a surface crossing
    Bubbles,
}

/// Event emitted by a ragdoll.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RagdollEvent {
    /// Health change of the owning character (negative is damage)
    HealthDelta {
        amount: f32,
    },

    /// Impact sound of a limb hitting something
    HitSound {
        limb: LimbId,
        volume: f32,
        range: f32,
    },

    /// Damage sound scaled by the strongest impact so far
    DamageSound {
        limb: LimbId,
        strength: f32,
    },

    /// Camera shake for the locally controlled character
    CameraShake {
        strength: f32,
    },

    /// Particle emission
    Particle {
        kind: ParticleKind,
        position: Vec2,
        velocity: Vec2,
    },

    /// A surface wave column was set by a splash
    Wave {
        hull: HullId,
        column: usize,
        velocity: f32,
    },

    /// Every limb was snapped to its authoritative state
    HardReset {
        distance: f32,
    },
}

impl RagdollEvent {
    /// Processing priority.
    pub fn priority(&self) -> EventPriority {
        match self {
            RagdollEvent::HealthDelta { .. } => EventPriority::Damage,
            RagdollEvent::HardReset { .. } => EventPriority::Reset,
            RagdollEvent::Particle { .. } | RagdollEvent::Wave { .. } => EventPriority::Fluid,
            RagdollEvent::HitSound { .. }
            | RagdollEvent::DamageSound { .. }
            | RagdollEvent::CameraShake { .. } => EventPriority::Feedback,
        }
    }

    /// Damage event.
    pub fn damage(amount: f32) -> Self {
        RagdollEvent::HealthDelta { amount: -amount }
    }

    /// Particle event.
    pub fn particle(kind: ParticleKind, position: Vec2, velocity: Vec2) -> Self {
        RagdollEvent::Particle { kind, position, velocity }
    }
}
