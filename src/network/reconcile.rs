//! Limb Reconciliation
//!
//! Pulls a client-side ragdoll toward the authoritative state received from
//! the server. Small divergence is ignored, moderate divergence becomes a
//! movement correction, and large divergence snaps every limb into place.
//!
//! ```text
//!   dist < allowed ............ accept, clear targets
//!   allowed <= dist ........... correction = lerp(target, dir * speed, blend)
//!   dist > reset, all targets . hard reset (teleport + velocity overwrite)
//! ```
//!
//! Only limb mirrors are written; the ragdoll pushes them to the engine on
//! its next flush.

use glam::Vec2;
use tracing::{debug, info};

use crate::ragdoll::{Ragdoll, RagdollEvent};

/// What a reconciliation pass did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReconcileOutcome {
    /// No reference limb or no pending target
    Idle,
    /// Divergence within tolerance; targets cleared
    WithinTolerance,
    /// Correction movement set
    Correcting {
        /// Distance from the reference limb to its target
        distance: f32,
    },
    /// Every limb snapped to its target
    Reset {
        /// Distance from the reference limb to its target
        distance: f32,
    },
}

/// Run one reconciliation pass over `ragdoll`.
pub fn reconcile(ragdoll: &mut Ragdoll) -> ReconcileOutcome {
    let reference = ragdoll
        .reference_limb()
        .and_then(|limb| limb.target().map(|target| (limb.position(), *target)));
    let Some((position, target)) = reference else {
        ragdoll.correction_movement = Vec2::ZERO;
        return ReconcileOutcome::Idle;
    };

    let net = &ragdoll.config.net;
    let diff = target.position - position;
    let distance = diff.length();
    let allowed = net.allowed_for(ragdoll.in_water);

    if diff == Vec2::ZERO || distance < allowed {
        for limb in ragdoll.limbs_mut() {
            limb.clear_target();
        }
        ragdoll.correction_movement = Vec2::ZERO;
        return ReconcileOutcome::WithinTolerance;
    }

    let speed = (distance * net.correction_gain).clamp(net.min_correction, net.max_correction);
    let mut correction = ragdoll
        .target_movement()
        .lerp(diff.normalize_or_zero() * speed, net.correction_blend());
    if !ragdoll.in_water && correction.y.abs() < net.vertical_deadzone {
        correction.y = 0.0;
    }
    let reset = distance > net.reset_distance()
        && ragdoll.limbs().filter(|l| !l.ignore_collisions).all(|l| l.has_target());

    ragdoll.correction_movement = correction;
    if !reset {
        debug!("Correcting ragdoll by {:?} (off by {:.3})", correction, distance);
        return ReconcileOutcome::Correcting { distance };
    }

    info!("Resetting ragdoll limbs (off by {:.3})", distance);
    for limb in ragdoll.limbs_mut() {
        match limb.target().copied() {
            Some(t) => {
                limb.set_velocity(t.linear_velocity, t.angular_velocity);
                limb.set_transform(t.position, t.rotation);
                limb.clear_target();
            }
            None => {
                let rotation = limb.rotation();
                limb.set_transform(limb.position() + diff, rotation);
            }
        }
    }
    ragdoll.push_event(RagdollEvent::HardReset { distance });
    ReconcileOutcome::Reset { distance }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RagdollConfig;
    use crate::physics::SandboxWorld;
    use crate::ragdoll::testing::humanoid;
    use crate::ragdoll::{LimbId, LimbTarget};

    fn ragdoll() -> Ragdoll {
        let mut world = SandboxWorld::default();
        let mut ragdoll = Ragdoll::new(&humanoid(), Vec2::ZERO, 0, RagdollConfig::default(), &mut world);
        for limb in ragdoll.limbs_mut() {
            limb.set_transform(Vec2::new(0.0, limb.id.0 as f32), 0.0);
        }
        ragdoll
    }

    fn target_at(position: Vec2) -> LimbTarget {
        LimbTarget { position, ..LimbTarget::default() }
    }

    fn set_reference_target(ragdoll: &mut Ragdoll, offset: Vec2) {
        let limb = ragdoll.limb_by_id_mut(LimbId(0)).unwrap();
        let target = target_at(limb.position() + offset);
        limb.set_target(target);
    }

    #[test]
    fn test_idle_without_target() {
        let mut ragdoll = ragdoll();
        ragdoll.correction_movement = Vec2::ONE;
        assert_eq!(reconcile(&mut ragdoll), ReconcileOutcome::Idle);
        assert_eq!(ragdoll.correction_movement(), Vec2::ZERO);
    }

    #[test]
    fn test_within_tolerance_clears_targets() {
        let mut ragdoll = ragdoll();
        set_reference_target(&mut ragdoll, Vec2::new(0.05, 0.0));
        ragdoll.limb_by_id_mut(LimbId(1)).unwrap().set_target(target_at(Vec2::ONE));

        assert_eq!(reconcile(&mut ragdoll), ReconcileOutcome::WithinTolerance);
        assert!(ragdoll.limbs().all(|l| !l.has_target()));
        assert_eq!(ragdoll.correction_movement(), Vec2::ZERO);
    }

    #[test]
    fn test_fluid_doubles_tolerance() {
        let mut ragdoll = ragdoll();
        ragdoll.in_water = true;
        set_reference_target(&mut ragdoll, Vec2::new(0.15, 0.0));
        assert_eq!(reconcile(&mut ragdoll), ReconcileOutcome::WithinTolerance);
    }

    #[test]
    fn test_correction() {
        let mut ragdoll = ragdoll();
        set_reference_target(&mut ragdoll, Vec2::new(0.5, 0.0));

        let outcome = reconcile(&mut ragdoll);
        assert!(matches!(outcome, ReconcileOutcome::Correcting { distance } if (distance - 0.5).abs() < 1e-6));
        // speed = clamp(0.5 * 5, 0.1, 5) = 2.5; lerp(0, (2.5, 0), 0.2) = (0.5, 0)
        assert!((ragdoll.correction_movement() - Vec2::new(0.5, 0.0)).length() < 1e-6);
        assert_eq!(ragdoll.effective_target_movement(), ragdoll.correction_movement());
        // Target kept for the next pass
        assert!(ragdoll.limb_by_id(LimbId(0)).unwrap().has_target());
    }

    #[test]
    fn test_vertical_deadzone_on_land() {
        let mut ragdoll = ragdoll();
        set_reference_target(&mut ragdoll, Vec2::new(1.0, 0.1));
        reconcile(&mut ragdoll);
        assert_eq!(ragdoll.correction_movement().y, 0.0);

        ragdoll.in_water = true;
        reconcile(&mut ragdoll);
        assert!(ragdoll.correction_movement().y > 0.0);
    }

    #[test]
    fn test_far_without_all_targets_only_corrects() {
        let mut ragdoll = ragdoll();
        set_reference_target(&mut ragdoll, Vec2::new(5.0, 0.0));
        assert!(matches!(reconcile(&mut ragdoll), ReconcileOutcome::Correcting { .. }));
        assert_eq!(ragdoll.limb_by_id(LimbId(2)).unwrap().position(), Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_hard_reset() {
        let mut ragdoll = ragdoll();
        let offset = Vec2::new(5.0, 0.0);
        for limb in ragdoll.limbs_mut() {
            let target = LimbTarget {
                position: limb.position() + offset,
                rotation: 0.3,
                linear_velocity: Vec2::new(1.0, 2.0),
                angular_velocity: 0.5,
            };
            limb.set_target(target);
        }

        let outcome = reconcile(&mut ragdoll);
        assert!(matches!(outcome, ReconcileOutcome::Reset { .. }));
        for limb in ragdoll.limbs() {
            assert_eq!(limb.position(), Vec2::new(5.0, limb.id.0 as f32));
            assert_eq!(limb.rotation(), 0.3);
            assert_eq!(limb.linear_velocity(), Vec2::new(1.0, 2.0));
            assert!(!limb.has_target());
        }
        assert!(ragdoll
            .take_events()
            .iter()
            .any(|e| matches!(e, RagdollEvent::HardReset { .. })));
    }

    #[test]
    fn test_hard_reset_translates_limbs_without_target() {
        let mut def = humanoid();
        def.limbs[3].ignore_collisions = true;
        let mut world = SandboxWorld::default();
        let mut ragdoll = Ragdoll::new(&def, Vec2::ZERO, 0, RagdollConfig::default(), &mut world);
        for limb in ragdoll.limbs_mut() {
            limb.set_transform(Vec2::new(0.0, limb.id.0 as f32), 0.0);
            if !limb.ignore_collisions {
                let target = target_at(limb.position() + Vec2::new(4.0, 0.0));
                limb.set_target(target);
            }
        }

        assert!(matches!(reconcile(&mut ragdoll), ReconcileOutcome::Reset { .. }));
        assert_eq!(ragdoll.limb_by_id(LimbId(3)).unwrap().position(), Vec2::new(4.0, 3.0));
    }
}
