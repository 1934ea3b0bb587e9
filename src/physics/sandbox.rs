//! Sandbox Physics World
//!
//! Minimal engine used by tests and the demo binary. It integrates
//! velocities under gravity, keeps joints as bookkeeping (no constraint
//! solving) and resolves only the contacts queued with [`SandboxWorld::queue_contact`].
//! Every queued contact passes the collision filter before it reaches the
//! listener, and the listener's verdict is recorded for inspection.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

use crate::core::error::EngineError;
use crate::physics::{
    BodyDesc, BodyHandle, BodyState, CollisionGroups, Contact, ContactListener, ContactTarget,
    JointHandle, PhysicsEngine, RevoluteJointDesc,
};

/// Standard gravity in simulation units.
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, -9.81);

#[derive(Clone, Debug)]
struct SandboxBody {
    state: BodyState,
    mass: f32,
    enabled: bool,
    category: CollisionGroups,
    collides_with: CollisionGroups,
    force: Vec2,
}

/// A joint as stored by the sandbox.
#[derive(Clone, Debug, PartialEq)]
pub struct SandboxJoint {
    /// Creation parameters, updated by limit/anchor writes
    pub desc: RevoluteJointDesc,
    /// Enabled flag
    pub enabled: bool,
}

/// Outcome of one queued contact.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactRecord {
    /// The contact
    pub contact: Contact,
    /// Listener verdict (`None` when filtered before reaching the listener)
    pub accepted: Option<bool>,
}

/// In-memory physics world.
#[derive(Debug)]
pub struct SandboxWorld {
    /// Gravity acceleration
    pub gravity: Vec2,
    bodies: BTreeMap<BodyHandle, SandboxBody>,
    joints: BTreeMap<JointHandle, SandboxJoint>,
    next_body: u32,
    next_joint: u32,
    queued_contacts: Vec<Contact>,
    contact_log: Vec<ContactRecord>,
    locked_filters: BTreeSet<BodyHandle>,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY)
    }
}

impl SandboxWorld {
    /// Create an empty world.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: BTreeMap::new(),
            joints: BTreeMap::new(),
            next_body: 0,
            next_joint: 0,
            queued_contacts: Vec::new(),
            contact_log: Vec::new(),
            locked_filters: BTreeSet::new(),
        }
    }

    /// Queue a contact to be reported during the next step.
    pub fn queue_contact(&mut self, contact: Contact) {
        self.queued_contacts.push(contact);
    }

    /// Contacts processed by the most recent step.
    pub fn contact_log(&self) -> &[ContactRecord] {
        &self.contact_log
    }

    /// Make every future collision filter update of `body` fail.
    pub fn lock_filter(&mut self, body: BodyHandle) {
        self.locked_filters.insert(body);
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of live joints.
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Joint bookkeeping.
    pub fn joint(&self, joint: JointHandle) -> Option<&SandboxJoint> {
        self.joints.get(&joint)
    }

    /// Whether a body is enabled.
    pub fn body_enabled(&self, body: BodyHandle) -> Option<bool> {
        self.bodies.get(&body).map(|b| b.enabled)
    }

    /// Categories a body collides with.
    pub fn collides_with(&self, body: BodyHandle) -> Option<CollisionGroups> {
        self.bodies.get(&body).map(|b| b.collides_with)
    }

    /// Force accumulated for the next step.
    pub fn pending_force(&self, body: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&body).map(|b| b.force)
    }

    fn body_mut(&mut self, body: BodyHandle) -> Result<&mut SandboxBody, EngineError> {
        self.bodies.get_mut(&body).ok_or(EngineError::UnknownBody(body))
    }

    fn joint_mut(&mut self, joint: JointHandle) -> Result<&mut SandboxJoint, EngineError> {
        self.joints.get_mut(&joint).ok_or(EngineError::UnknownJoint(joint))
    }

    fn target_category(&self, target: &ContactTarget) -> CollisionGroups {
        match target {
            ContactTarget::Body(other) => self
                .bodies
                .get(other)
                .map(|b| b.category)
                .unwrap_or(CollisionGroups::NONE),
            _ => target.category(),
        }
    }
}

impl PhysicsEngine for SandboxWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, EngineError> {
        if !(desc.mass.is_finite() && desc.mass > 0.0) {
            return Err(EngineError::InvalidBody(format!("mass {}", desc.mass)));
        }
        let handle = BodyHandle(self.next_body);
        self.next_body += 1;
        self.bodies.insert(
            handle,
            SandboxBody {
                state: BodyState {
                    position: desc.position,
                    rotation: desc.rotation,
                    ..BodyState::default()
                },
                mass: desc.mass,
                enabled: true,
                category: desc.category,
                collides_with: desc.collides_with,
                force: Vec2::ZERO,
            },
        );
        Ok(handle)
    }

    fn remove_body(&mut self, body: BodyHandle) -> Result<(), EngineError> {
        let attached = self
            .joints
            .values()
            .any(|j| j.desc.body_a == body || j.desc.body_b == body);
        if attached {
            return Err(EngineError::Rejected(format!("{:?} still has joints", body)));
        }
        self.bodies.remove(&body).map(|_| ()).ok_or(EngineError::UnknownBody(body))
    }

    fn create_joint(&mut self, desc: &RevoluteJointDesc) -> Result<JointHandle, EngineError> {
        for body in [desc.body_a, desc.body_b] {
            if !self.bodies.contains_key(&body) {
                return Err(EngineError::UnknownBody(body));
            }
        }
        let handle = JointHandle(self.next_joint);
        self.next_joint += 1;
        self.joints.insert(handle, SandboxJoint { desc: *desc, enabled: true });
        Ok(handle)
    }

    fn remove_joint(&mut self, joint: JointHandle) -> Result<(), EngineError> {
        self.joints.remove(&joint).map(|_| ()).ok_or(EngineError::UnknownJoint(joint))
    }

    fn body_state(&self, body: BodyHandle) -> Option<BodyState> {
        self.bodies.get(&body).map(|b| b.state)
    }

    fn set_transform(&mut self, body: BodyHandle, position: Vec2, rotation: f32) -> Result<(), EngineError> {
        let b = self.body_mut(body)?;
        b.state.position = position;
        b.state.rotation = rotation;
        Ok(())
    }

    fn set_velocity(&mut self, body: BodyHandle, linear: Vec2, angular: f32) -> Result<(), EngineError> {
        let b = self.body_mut(body)?;
        b.state.linear_velocity = linear;
        b.state.angular_velocity = angular;
        Ok(())
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec2) -> Result<(), EngineError> {
        self.body_mut(body)?.force += force;
        Ok(())
    }

    fn set_body_enabled(&mut self, body: BodyHandle, enabled: bool) -> Result<(), EngineError> {
        self.body_mut(body)?.enabled = enabled;
        Ok(())
    }

    fn set_joint_enabled(&mut self, joint: JointHandle, enabled: bool) -> Result<(), EngineError> {
        self.joint_mut(joint)?.enabled = enabled;
        Ok(())
    }

    fn set_joint_limits(&mut self, joint: JointHandle, limits: Option<(f32, f32)>) -> Result<(), EngineError> {
        self.joint_mut(joint)?.desc.limits = limits;
        Ok(())
    }

    fn set_joint_anchors(&mut self, joint: JointHandle, anchor_a: Vec2, anchor_b: Vec2) -> Result<(), EngineError> {
        let j = self.joint_mut(joint)?;
        j.desc.anchor_a = anchor_a;
        j.desc.anchor_b = anchor_b;
        Ok(())
    }

    fn set_collides_with(&mut self, body: BodyHandle, groups: CollisionGroups) -> Result<(), EngineError> {
        if self.locked_filters.contains(&body) {
            return Err(EngineError::Rejected(format!("collision filter of {:?} is locked", body)));
        }
        self.body_mut(body)?.collides_with = groups;
        Ok(())
    }

    fn step(&mut self, dt: f32, listener: &mut dyn ContactListener) {
        self.contact_log.clear();

        // 1. Narrow phase: report queued contacts
        for contact in std::mem::take(&mut self.queued_contacts) {
            let other_category = self.target_category(&contact.other);
            let passes_filter = self
                .bodies
                .get(&contact.body)
                .is_some_and(|b| b.enabled && b.collides_with.contains(other_category));

            if !passes_filter {
                self.contact_log.push(ContactRecord { contact, accepted: None });
                continue;
            }

            let accepted = listener.on_contact(&contact);
            if accepted {
                // Cancel the velocity component moving into the other shape
                if let Some(body) = self.bodies.get_mut(&contact.body) {
                    let into = body.state.linear_velocity.dot(contact.normal);
                    if into < 0.0 {
                        body.state.linear_velocity -= contact.normal * into;
                    }
                }
            }
            self.contact_log.push(ContactRecord { contact, accepted: Some(accepted) });
        }

        // 2. Integrate enabled bodies
        let gravity = self.gravity;
        for body in self.bodies.values_mut() {
            if !body.enabled {
                body.force = Vec2::ZERO;
                continue;
            }
            let acceleration = gravity + body.force / body.mass;
            body.state.linear_velocity += acceleration * dt;
            body.state.position += body.state.linear_velocity * dt;
            body.state.rotation += body.state.angular_velocity * dt;
            body.force = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{AcceptAll, Shape};

    fn body_desc(position: Vec2) -> BodyDesc {
        BodyDesc {
            position,
            rotation: 0.0,
            mass: 2.0,
            shape: Shape::Circle { radius: 0.1 },
            category: CollisionGroups::CHARACTER,
            collides_with: CollisionGroups::WALL,
        }
    }

    struct RejectAll;

    impl ContactListener for RejectAll {
        fn on_contact(&mut self, _contact: &Contact) -> bool {
            false
        }
    }

    #[test]
    fn test_gravity_integration() {
        let mut world = SandboxWorld::default();
        let body = world.create_body(&body_desc(Vec2::ZERO)).unwrap();

        world.step(1.0, &mut AcceptAll);
        let state = world.body_state(body).unwrap();
        assert_eq!(state.linear_velocity, DEFAULT_GRAVITY);
        assert_eq!(state.position, DEFAULT_GRAVITY);
    }

    #[test]
    fn test_force_is_consumed() {
        let mut world = SandboxWorld::new(Vec2::ZERO);
        let body = world.create_body(&body_desc(Vec2::ZERO)).unwrap();
        world.apply_force(body, Vec2::new(4.0, 0.0)).unwrap();

        world.step(1.0, &mut AcceptAll);
        assert_eq!(world.body_state(body).unwrap().linear_velocity, Vec2::new(2.0, 0.0));
        assert_eq!(world.pending_force(body), Some(Vec2::ZERO));
    }

    #[test]
    fn test_disabled_body_does_not_move() {
        let mut world = SandboxWorld::default();
        let body = world.create_body(&body_desc(Vec2::ONE)).unwrap();
        world.set_body_enabled(body, false).unwrap();

        world.step(1.0, &mut AcceptAll);
        assert_eq!(world.body_state(body).unwrap().position, Vec2::ONE);
    }

    #[test]
    fn test_invalid_mass_rejected() {
        let mut world = SandboxWorld::default();
        let mut desc = body_desc(Vec2::ZERO);
        desc.mass = 0.0;
        assert!(matches!(world.create_body(&desc), Err(EngineError::InvalidBody(_))));
    }

    #[test]
    fn test_body_with_joint_cannot_be_removed() {
        let mut world = SandboxWorld::default();
        let a = world.create_body(&body_desc(Vec2::ZERO)).unwrap();
        let b = world.create_body(&body_desc(Vec2::ONE)).unwrap();
        let joint = world
            .create_joint(&RevoluteJointDesc {
                body_a: a,
                body_b: b,
                anchor_a: Vec2::ZERO,
                anchor_b: Vec2::ZERO,
                collide_connected: false,
                limits: None,
                motor_enabled: true,
                max_motor_torque: 0.25,
            })
            .unwrap();

        assert!(matches!(world.remove_body(a), Err(EngineError::Rejected(_))));
        world.remove_joint(joint).unwrap();
        world.remove_body(a).unwrap();
        world.remove_body(b).unwrap();
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_contact_filter_and_response() {
        let mut world = SandboxWorld::new(Vec2::ZERO);
        let body = world.create_body(&body_desc(Vec2::ZERO)).unwrap();
        world.set_velocity(body, Vec2::new(0.0, -3.0), 0.0).unwrap();

        // Filtered: body does not collide with level geometry
        world.queue_contact(Contact { body, other: ContactTarget::Level, normal: Vec2::Y });
        world.step(0.0, &mut AcceptAll);
        assert_eq!(world.contact_log()[0].accepted, None);

        // Rejected contact leaves velocity untouched
        let wall = crate::environment::Structure::solid(0, crate::core::math::Rect::new(0.0, 0.0, 1.0, 1.0));
        world.queue_contact(Contact { body, other: ContactTarget::Structure(wall.clone()), normal: Vec2::Y });
        world.step(0.0, &mut RejectAll);
        assert_eq!(world.contact_log()[0].accepted, Some(false));
        assert_eq!(world.body_state(body).unwrap().linear_velocity.y, -3.0);

        // Accepted contact cancels the approach velocity
        world.queue_contact(Contact { body, other: ContactTarget::Structure(wall), normal: Vec2::Y });
        world.step(0.0, &mut AcceptAll);
        assert_eq!(world.contact_log()[0].accepted, Some(true));
        assert_eq!(world.body_state(body).unwrap().linear_velocity.y, 0.0);
    }

    #[test]
    fn test_locked_filter() {
        let mut world = SandboxWorld::default();
        let body = world.create_body(&body_desc(Vec2::ZERO)).unwrap();
        world.lock_filter(body);
        assert!(world.set_collides_with(body, CollisionGroups::ALL).is_err());
        assert_eq!(world.collides_with(body), Some(CollisionGroups::WALL));
    }
}
