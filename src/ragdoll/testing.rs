//! Shared fixtures for unit tests.

use glam::Vec2;

use crate::physics::Shape;
use crate::ragdoll::definition::{JointDescriptor, LimbDescriptor, RagdollDefinition};
use crate::ragdoll::limb::LimbType;

/// Torso with a head and two feet.
///
/// Limb IDs: 0 torso (10), 1 head (4), 2 left foot (1), 3 right foot (1).
pub(crate) fn humanoid() -> RagdollDefinition {
    RagdollDefinition {
        limbs: vec![
            LimbDescriptor::new(0, LimbType::Torso, 10.0, Shape::Rect { width: 0.3, height: 0.6 }),
            LimbDescriptor::new(1, LimbType::Head, 4.0, Shape::Circle { radius: 0.15 }),
            LimbDescriptor::new(2, LimbType::LeftFoot, 1.0, Shape::Capsule { radius: 0.05, height: 0.2 }),
            LimbDescriptor::new(3, LimbType::RightFoot, 1.0, Shape::Capsule { radius: 0.05, height: 0.2 }),
        ],
        joints: vec![
            JointDescriptor::new(0, 1, Vec2::new(0.0, 0.35), Vec2::new(0.0, -0.1)).with_limits(-20.0, 40.0),
            JointDescriptor::new(0, 2, Vec2::new(-0.1, -0.35), Vec2::new(0.0, 0.1)).with_limits(-45.0, 45.0),
            JointDescriptor::new(0, 3, Vec2::new(0.1, -0.35), Vec2::new(0.0, 0.1)).with_limits(-45.0, 45.0),
        ],
    }
}
