//! Terrain Contact Classification
//!
//! Decides per contact whether the engine resolves it. One-way platforms
//! hold only limbs that are above them; staircases carry only the feet, and
//! only while the character is actually climbing.
//!
//! ```text
//!   contact ─┬─ not a structure ─────────────────────► accept + impact
//!            ├─ platform ─┬─ ignoring platforms ─────► reject
//!            │            ├─ lowest limb below top ──► reject
//!            │            └─ otherwise ──────────────► accept + impact
//!            ├─ stairs ───┬─ heading down / at foot ─► release, reject
//!            │            ├─ heading up / near top ──► release, reject
//!            │            ├─ foot from above ────────► stand on it, accept
//!            │            └─ anything else ──────────► reject
//!            └─ other structure ─────────────────────► accept + impact
//! ```

use tracing::trace;

use crate::environment::Structure;
use crate::physics::{Contact, ContactListener, ContactTarget};
use crate::ragdoll::assembly::Ragdoll;
use crate::ragdoll::limb::LimbId;

impl Ragdoll {
    /// Classify a contact of `limb`. Returns whether it is resolved.
    pub fn classify_contact(&mut self, limb: LimbId, contact: &Contact) -> bool {
        let structure = match &contact.other {
            ContactTarget::Structure(structure) => structure,
            ContactTarget::Body(_) | ContactTarget::Level => {
                self.evaluate_impact(limb, contact.normal);
                return true;
            }
        };

        if structure.is_platform {
            if self.ignore_platforms {
                return false;
            }
            let holds = match self.lowest_limb() {
                Some(lowest) => lowest.position().y >= structure.rect.top(),
                None => false,
            };
            if !holds {
                return false;
            }
        } else if structure.is_stairs() {
            return self.classify_stairs(limb, contact, structure);
        }

        self.evaluate_impact(limb, contact.normal);
        true
    }

    fn classify_stairs(&mut self, limb: LimbId, contact: &Contact, structure: &Structure) -> bool {
        let Some(lowest_y) = self.lowest_limb().map(|l| l.position().y) else {
            return false;
        };
        let target = self.target_movement();
        let bottom = structure.rect.bottom() + self.config.stairs_bottom_margin;
        let top = structure.rect.top() - self.config.stairs_top_margin;

        if target.y < self.config.stairs_climb_intent && (self.in_water || lowest_y < bottom) {
            self.release_stairs();
            return false;
        }
        if target.y >= 0.0 && lowest_y > top {
            self.release_stairs();
            return false;
        }

        let is_foot = self.limb_by_id(limb).is_some_and(|l| l.limb_type.is_foot());
        if !is_foot {
            return false;
        }
        if contact.normal.y >= 0.0 {
            if self.stairs.as_ref().map(|s| s.id) != Some(structure.id) {
                trace!("Standing on stairs {}", structure.id);
            }
            self.stairs = Some(structure.clone());
            true
        } else {
            self.release_stairs();
            false
        }
    }

    fn release_stairs(&mut self) {
        if let Some(stairs) = self.stairs.take() {
            trace!("Left stairs {}", stairs.id);
        }
    }
}

impl ContactListener for Ragdoll {
    fn on_contact(&mut self, contact: &Contact) -> bool {
        match self.limb_for_body(contact.body) {
            Some(limb) => self.classify_contact(limb, contact),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::core::config::RagdollConfig;
    use crate::core::math::Rect;
    use crate::environment::StairDirection;
    use crate::physics::{PhysicsEngine, SandboxWorld};
    use crate::ragdoll::events::RagdollEvent;
    use crate::ragdoll::limb::LimbType;
    use crate::ragdoll::testing::humanoid;

    fn setup() -> (Ragdoll, SandboxWorld) {
        let mut world = SandboxWorld::default();
        let ragdoll = Ragdoll::new(&humanoid(), Vec2::new(0.0, 5.0), 0, RagdollConfig::default(), &mut world);
        (ragdoll, world)
    }

    fn place_lowest(ragdoll: &mut Ragdoll, y: f32) {
        let foot = ragdoll.limb(LimbType::LeftFoot).unwrap().id;
        for limb in ragdoll.limbs_mut() {
            let offset = if limb.id == foot { 0.0 } else { 1.0 };
            limb.set_transform(Vec2::new(0.0, y + offset), 0.0);
        }
        ragdoll.find_lowest_limb();
    }

    fn contact(ragdoll: &Ragdoll, limb_type: LimbType, structure: Structure, normal: Vec2) -> (LimbId, Contact) {
        let limb = ragdoll.limb(limb_type).unwrap();
        (limb.id, Contact { body: limb.body(), other: ContactTarget::Structure(structure), normal })
    }

    fn stairs() -> Structure {
        // top 2.0, bottom 0.0
        Structure::stairs(7, Rect::new(0.0, 2.0, 4.0, 2.0), StairDirection::Right)
    }

    #[test]
    fn test_platform_above_lowest_limb_accepted() {
        let (mut ragdoll, _) = setup();
        place_lowest(&mut ragdoll, 1.5);
        let platform = Structure::platform(1, Rect::new(0.0, 1.0, 4.0, 0.2));
        let (limb, c) = contact(&ragdoll, LimbType::LeftFoot, platform, Vec2::Y);
        assert!(ragdoll.classify_contact(limb, &c));
    }

    #[test]
    fn test_platform_below_lowest_limb_rejected() {
        let (mut ragdoll, _) = setup();
        place_lowest(&mut ragdoll, 0.5);
        let platform = Structure::platform(1, Rect::new(0.0, 1.0, 4.0, 0.2));
        let (limb, c) = contact(&ragdoll, LimbType::Torso, platform, Vec2::Y);
        assert!(!ragdoll.classify_contact(limb, &c));
    }

    #[test]
    fn test_platform_ignored() {
        let (mut ragdoll, mut world) = setup();
        place_lowest(&mut ragdoll, 1.5);
        ragdoll.set_ignore_platforms(true, &mut world);
        let platform = Structure::platform(1, Rect::new(0.0, 1.0, 4.0, 0.2));
        let (limb, c) = contact(&ragdoll, LimbType::LeftFoot, platform, Vec2::Y);
        assert!(!ragdoll.classify_contact(limb, &c));
    }

    #[test]
    fn test_platform_without_lowest_limb_rejected() {
        let (mut ragdoll, _) = setup();
        let platform = Structure::platform(1, Rect::new(0.0, 1.0, 4.0, 0.2));
        let (limb, c) = contact(&ragdoll, LimbType::LeftFoot, platform, Vec2::Y);
        assert!(!ragdoll.classify_contact(limb, &c));
    }

    #[test]
    fn test_foot_on_stairs_from_above() {
        let (mut ragdoll, _) = setup();
        place_lowest(&mut ragdoll, 0.6);
        ragdoll.set_target_movement(Vec2::new(1.0, 0.6));

        let (limb, c) = contact(&ragdoll, LimbType::LeftFoot, stairs(), Vec2::Y);
        assert!(ragdoll.classify_contact(limb, &c));
        assert_eq!(ragdoll.stairs().map(|s| s.id), Some(7));
        // Stairs contacts never evaluate impact.
        assert!(ragdoll.take_events().is_empty());
    }

    #[test]
    fn test_climbing_foot_kept_on_stairs_during_correction() {
        let (mut ragdoll, _) = setup();
        place_lowest(&mut ragdoll, 0.2);
        ragdoll.set_target_movement(Vec2::new(1.0, 1.0));
        ragdoll.correction_movement = Vec2::new(1.0, 0.0);

        let (limb, c) = contact(&ragdoll, LimbType::LeftFoot, stairs(), Vec2::Y);
        assert!(ragdoll.classify_contact(limb, &c));
        assert_eq!(ragdoll.stairs().map(|s| s.id), Some(7));
    }

    #[test]
    fn test_stairs_released_at_foot_of_stairs() {
        let (mut ragdoll, _) = setup();
        place_lowest(&mut ragdoll, 0.2);
        ragdoll.stairs = Some(stairs());
        ragdoll.set_target_movement(Vec2::ZERO);

        let (limb, c) = contact(&ragdoll, LimbType::LeftFoot, stairs(), Vec2::Y);
        assert!(!ragdoll.classify_contact(limb, &c));
        assert!(ragdoll.stairs().is_none());
    }

    #[test]
    fn test_stairs_released_in_fluid() {
        let (mut ragdoll, _) = setup();
        place_lowest(&mut ragdoll, 1.0);
        ragdoll.in_water = true;
        ragdoll.set_target_movement(Vec2::new(1.0, -1.0));

        let (limb, c) = contact(&ragdoll, LimbType::LeftFoot, stairs(), Vec2::Y);
        assert!(!ragdoll.classify_contact(limb, &c));
    }

    #[test]
    fn test_stairs_released_near_top() {
        let (mut ragdoll, _) = setup();
        // top 2.0 - 1.28 = 0.72
        place_lowest(&mut ragdoll, 0.8);
        ragdoll.stairs = Some(stairs());
        ragdoll.set_target_movement(Vec2::new(0.0, 1.0));

        let (limb, c) = contact(&ragdoll, LimbType::LeftFoot, stairs(), Vec2::Y);
        assert!(!ragdoll.classify_contact(limb, &c));
        assert!(ragdoll.stairs().is_none());
    }

    #[test]
    fn test_foot_below_stairs_rejected() {
        let (mut ragdoll, _) = setup();
        place_lowest(&mut ragdoll, 0.6);
        ragdoll.stairs = Some(stairs());
        ragdoll.set_target_movement(Vec2::new(0.0, -1.0));

        let (limb, c) = contact(&ragdoll, LimbType::LeftFoot, stairs(), Vec2::new(0.0, -1.0));
        assert!(!ragdoll.classify_contact(limb, &c));
        assert!(ragdoll.stairs().is_none());
    }

    #[test]
    fn test_non_foot_never_stands_on_stairs() {
        let (mut ragdoll, _) = setup();
        place_lowest(&mut ragdoll, 0.6);
        ragdoll.set_target_movement(Vec2::new(0.0, -1.0));

        let (limb, c) = contact(&ragdoll, LimbType::Torso, stairs(), Vec2::Y);
        assert!(!ragdoll.classify_contact(limb, &c));
        assert!(ragdoll.stairs().is_none());
    }

    #[test]
    fn test_wall_contact_evaluates_impact() {
        let (mut ragdoll, _) = setup();
        for limb in ragdoll.limbs_mut() {
            limb.set_velocity(Vec2::new(-20.0, 0.0), 0.0);
        }
        let wall = Structure::solid(3, Rect::new(-1.0, 10.0, 1.0, 10.0));
        let (limb, c) = contact(&ragdoll, LimbType::Torso, wall, Vec2::X);
        assert!(ragdoll.classify_contact(limb, &c));
        assert!(ragdoll
            .take_events()
            .iter()
            .any(|e| matches!(e, RagdollEvent::HealthDelta { .. })));
    }

    #[test]
    fn test_listener_routes_through_engine() {
        let (mut ragdoll, mut world) = setup();
        place_lowest(&mut ragdoll, 0.5);
        ragdoll.flush_to_engine(&mut world);
        let platform = Structure::platform(1, Rect::new(0.0, 1.0, 4.0, 0.2));
        let (_, c) = contact(&ragdoll, LimbType::LeftFoot, platform, Vec2::Y);

        world.queue_contact(c);
        world.step(0.0, &mut ragdoll);
        assert_eq!(world.contact_log()[0].accepted, Some(false));
    }
}
