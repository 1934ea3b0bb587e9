//! Buoyancy and Flow
//!
//! Tracks which hull the ragdoll is in, which limbs are below the fluid
//! surface, and applies gap flow to submerged limbs. Crossing the surface
//! fast enough splashes and disturbs the surface waves.

use glam::Vec2;
use tracing::{debug, info};

use crate::environment::{Environment, HullId};
use crate::ragdoll::assembly::Ragdoll;
use crate::ragdoll::events::{ParticleKind, RagdollEvent};
use crate::ragdoll::limb::LimbType;

/// Splash particle speed per unit of vertical limb speed.
const SPLASH_VELOCITY_SCALE: f32 = 10.0;
/// Bubble particle speed per unit of limb velocity.
const BUBBLE_VELOCITY_SCALE: f32 = 0.001;

impl Ragdoll {
    /// Resolve the hull containing the reference limb.
    ///
    /// Returns `true` when the hull changed; collision categories then need
    /// an [`update_collision_categories`](Self::update_collision_categories).
    pub fn find_hull(&mut self, env: &dyn Environment) -> bool {
        let Some(position) = self.reference_limb().map(|l| l.position()) else {
            return false;
        };
        let hull = env.find_hull(position, self.current_hull);
        if hull == self.current_hull {
            return false;
        }
        info!("Ragdoll moved from hull {:?} to {:?}", self.current_hull, hull);
        self.current_hull = hull;
        true
    }

    /// Sum of gap flow forces pulling into `hull`, measured at the reference limb.
    pub fn flow_force(&self, env: &dyn Environment, hull: HullId) -> Vec2 {
        let Some(position) = self.reference_limb().map(|l| l.position()) else {
            return Vec2::ZERO;
        };
        let divisor = self.config.flow_force_divisor();
        env.gaps()
            .iter()
            .filter(|gap| gap.flow_target == Some(hull) && gap.flow_force != Vec2::ZERO)
            .map(|gap| {
                let distance = position.distance(gap.position);
                let strength = (gap.flow_force.length() - distance).max(0.0);
                gap.flow_force.normalize_or_zero() * strength / divisor
            })
            .fold(Vec2::ZERO, |acc, f| acc + f)
    }

    /// Update submersion, apply flow and emit surface-crossing effects.
    pub fn update_buoyancy(&mut self, env: &mut dyn Environment) {
        let current = self.current_hull.filter(|id| env.hull(*id).is_some());
        let flow = current.map_or(Vec2::ZERO, |hull| self.flow_force(&*env, hull));
        let apply_flow = flow.length() > self.config.min_flow_force;

        let splash_speed = self.config.splash_speed;
        let splash_scale = self.config.splash_impact_scale;
        let wave_width = self.config.wave_width();
        let max_wave = self.config.max_wave_velocity;

        let mut any_submerged = false;
        let mut head_submerged = false;
        let mut events = Vec::new();
        let mut waves = Vec::new();
        let mut strongest = self.strongest_impact;

        for limb in self.limbs.iter_mut().flatten() {
            let position = limb.position();
            let was_in_water = limb.in_water;

            let limb_hull = env
                .find_hull(position, current)
                .and_then(|id| env.hull(id))
                .map(|h| (h.id, h.surface(), h.rect.left(), h.is_submerged(position)));

            limb.in_water = limb_hull.map_or(true, |(.., submerged)| submerged);
            if limb.in_water {
                any_submerged = true;
                if limb.limb_type == LimbType::Head {
                    head_submerged = true;
                }
            }

            let Some((hull, surface, left, _)) = limb_hull else {
                continue;
            };
            if limb.in_water && apply_flow {
                limb.add_force(flow);
            }

            let velocity = limb.linear_velocity();
            if limb.in_water == was_in_water || velocity.y.abs() <= splash_speed {
                continue;
            }

            let surface_point = Vec2::new(position.x, surface);
            events.push(RagdollEvent::particle(
                ParticleKind::Splash,
                surface_point,
                Vec2::new(0.0, velocity.y.abs() * SPLASH_VELOCITY_SCALE),
            ));
            events.push(RagdollEvent::particle(
                ParticleKind::Bubbles,
                surface_point,
                velocity * BUBBLE_VELOCITY_SCALE,
            ));

            if velocity.y < 0.0 {
                // Flat entries hit harder than edge-on ones
                let parallel = limb.rotation().sin().abs();
                let impulse = velocity * (-parallel * limb.mass);
                let column = ((position.x - left) / wave_width).max(0.0) as usize;
                waves.push((hull, column, impulse.y.min(max_wave)));
                strongest = strongest.max(impulse.length() * splash_scale - limb.impact_tolerance);
            }
        }

        if current.is_some() {
            self.in_water = any_submerged;
            self.head_in_water = head_submerged;
        } else {
            self.in_water = true;
            self.head_in_water = true;
        }
        self.strongest_impact = strongest;

        for (hull, column, velocity) in waves {
            debug!("Splash wave in hull {:?} column {}: {:.2}", hull, column, velocity);
            env.perturb_wave(hull, column, velocity);
            events.push(RagdollEvent::Wave { hull, column, velocity });
        }
        self.pending_events.extend(events);
    }
}
