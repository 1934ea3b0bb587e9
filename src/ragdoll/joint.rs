//! Joints
//!
//! Revolute connection between two limbs. Limits are stored in radians.

use glam::Vec2;

use crate::core::math::mirror_x;
use crate::physics::JointHandle;
use crate::ragdoll::limb::LimbId;

/// Motor torque cap of every ragdoll joint.
pub const MAX_MOTOR_TORQUE: f32 = 0.25;

/// Revolute joint between two limbs.
#[derive(Clone, Debug, PartialEq)]
pub struct Joint {
    /// First limb
    pub limb_a: LimbId,
    /// Second limb
    pub limb_b: LimbId,
    pub(crate) handle: JointHandle,
    anchor_a: Vec2,
    anchor_b: Vec2,
    limits: Option<(f32, f32)>,
}

impl Joint {
    pub(crate) fn new(
        limb_a: LimbId,
        limb_b: LimbId,
        handle: JointHandle,
        anchors: (Vec2, Vec2),
        limits: Option<(f32, f32)>,
    ) -> Self {
        Self { limb_a, limb_b, handle, anchor_a: anchors.0, anchor_b: anchors.1, limits }
    }

    /// Engine handle.
    #[inline]
    pub fn handle(&self) -> JointHandle {
        self.handle
    }

    /// Local anchors on limb A and limb B.
    #[inline]
    pub fn anchors(&self) -> (Vec2, Vec2) {
        (self.anchor_a, self.anchor_b)
    }

    /// Angle limits (radians), if enabled.
    #[inline]
    pub fn limits(&self) -> Option<(f32, f32)> {
        self.limits
    }

    /// Rest angle of limb B relative to limb A.
    pub fn rest_angle(&self) -> f32 {
        self.limits.map_or(0.0, |(lower, upper)| (lower + upper) / 2.0)
    }

    /// Mirror the joint horizontally.
    pub(crate) fn mirror(&mut self) {
        self.limits = self.limits.map(|(lower, upper)| (-upper, -lower));
        self.anchor_a = mirror_x(self.anchor_a);
        self.anchor_b = mirror_x(self.anchor_b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joint() -> Joint {
        Joint::new(
            LimbId(0),
            LimbId(1),
            JointHandle(0),
            (Vec2::new(0.2, 0.5), Vec2::new(-0.1, 0.0)),
            Some((-0.5, 1.0)),
        )
    }

    #[test]
    fn test_mirror() {
        let mut joint = joint();
        joint.mirror();
        assert_eq!(joint.limits(), Some((-1.0, 0.5)));
        assert_eq!(joint.anchors(), (Vec2::new(-0.2, 0.5), Vec2::new(0.1, 0.0)));
    }

    #[test]
    fn test_mirror_twice_is_identity() {
        let original = joint();
        let mut joint = original.clone();
        joint.mirror();
        joint.mirror();
        assert_eq!(joint, original);
    }

    #[test]
    fn test_rest_angle() {
        assert_eq!(joint().rest_angle(), 0.25);
        let free = Joint::new(LimbId(0), LimbId(1), JointHandle(0), (Vec2::ZERO, Vec2::ZERO), None);
        assert_eq!(free.rest_angle(), 0.0);
    }
}
