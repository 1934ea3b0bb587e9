//! Impact Evaluation
//!
//! Turns an accepted contact into damage, sound and camera feedback.
//!
//! ```text
//!   impact = dot((v_limb + v_avg) / 2, -normal) * impact_scale
//!
//!   impact > hit_sound_floor, cooldown elapsed  ──► HitSound
//!   impact > tolerance                          ──► HealthDelta, DamageSound,
//!                                                   CameraShake (local only)
//! ```

use glam::Vec2;
use tracing::debug;

use crate::ragdoll::assembly::Ragdoll;
use crate::ragdoll::events::RagdollEvent;
use crate::ragdoll::limb::LimbId;

/// Impacts are divided by this to get the hit sound volume.
const HIT_VOLUME_DIVISOR: f32 = 5.0;
/// Hit sound range per unit of impact.
const HIT_RANGE_PER_IMPACT: f32 = 100.0;
/// Share of the tolerance that still counts as damage.
const TOLERANCE_DAMAGE_SHARE: f32 = 0.1;

impl Ragdoll {
    /// Mean linear velocity of all built limbs.
    pub fn average_velocity(&self) -> Vec2 {
        let (sum, count) = self
            .limbs()
            .fold((Vec2::ZERO, 0usize), |(sum, n), l| (sum + l.linear_velocity(), n + 1));
        if count == 0 {
            Vec2::ZERO
        } else {
            sum / count as f32
        }
    }

    /// Impact strength of `limb` hitting a surface with `normal`.
    ///
    /// The normal points from the surface toward the limb.
    pub fn impact_strength(&self, limb: LimbId, normal: Vec2) -> f32 {
        let Some(limb) = self.limb_by_id(limb) else {
            return 0.0;
        };
        let velocity = (limb.linear_velocity() + self.average_velocity()) / 2.0;
        velocity.dot(-normal) * self.config.impact_scale()
    }

    /// Evaluate the contact of `limb` against a surface with `normal`.
    pub fn evaluate_impact(&mut self, limb: LimbId, normal: Vec2) {
        let impact = self.impact_strength(limb, normal);
        self.apply_impact(limb, impact);
    }

    /// Emit the feedback of an impact of the given strength.
    pub fn apply_impact(&mut self, limb_id: LimbId, impact: f32) {
        let hit_sound_floor = self.config.hit_sound_floor;
        let cooldown = self.config.hit_sound_cooldown();
        let local = self.local_controlled;

        let Some(limb) = self.limb_by_id_mut(limb_id) else {
            return;
        };
        let tolerance = limb.impact_tolerance;

        let hit_sound = impact > hit_sound_floor && limb.sound_ready();
        if hit_sound {
            limb.start_sound_cooldown(cooldown);
        }

        if hit_sound {
            self.push_event(RagdollEvent::HitSound {
                limb: limb_id,
                volume: (impact / HIT_VOLUME_DIVISOR).min(1.0),
                range: impact * HIT_RANGE_PER_IMPACT,
            });
        }

        if impact > tolerance {
            debug!("Limb {:?} impact {:.2} over tolerance {:.2}", limb_id, impact, tolerance);
            self.push_event(RagdollEvent::damage(impact - tolerance * TOLERANCE_DAMAGE_SHARE));
            self.strongest_impact = self.strongest_impact.max(impact - tolerance);
            self.push_event(RagdollEvent::DamageSound { limb: limb_id, strength: self.strongest_impact });
            if local {
                self.push_event(RagdollEvent::CameraShake { strength: self.strongest_impact });
            }
        }
    }
}
