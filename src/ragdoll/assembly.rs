//! Ragdoll Assembly
//!
//! Builds a ragdoll from its definition and owns its limbs and joints.
//!
//! ```text
//!   RagdollDefinition ──► Ragdoll::new ──► PhysicsEngine (bodies, joints)
//!                              │
//!                              ▼
//!        limbs: [Option<Limb>; N]   joints: Vec<Joint>
//!        by_type, body_to_limb      reference / lowest limb
//! ```
//!
//! Limb state is mirrored from the engine after every step; writes made
//! between steps are pushed back by [`Ragdoll::flush_to_engine`].

use std::collections::BTreeMap;

use glam::Vec2;
use tracing::{debug, error, info, warn};

use crate::core::config::RagdollConfig;
use crate::core::error::{DefinitionError, EngineError};
use crate::core::math::clamp_components;
use crate::environment::{HullId, Structure};
use crate::physics::{BodyDesc, BodyHandle, CollisionGroups, PhysicsEngine, RevoluteJointDesc};
use crate::ragdoll::definition::{JointDescriptor, RagdollDefinition};
use crate::ragdoll::events::RagdollEvent;
use crate::ragdoll::joint::{Joint, MAX_MOTOR_TORQUE};
use crate::ragdoll::limb::{Limb, LimbId, LimbType};

/// Base draw depth of the first ragdoll in a level.
const BASE_DRAW_DEPTH: f32 = 0.1;
/// Draw depth step between live ragdolls.
const DRAW_DEPTH_STEP: f32 = 0.001;

/// Facing direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    /// Facing left
    Left,
    /// Facing right
    #[default]
    Right,
}

impl Direction {
    /// -1 for left, 1 for right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    /// The other direction.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Articulated body of a character.
#[derive(Debug)]
pub struct Ragdoll {
    pub(crate) limbs: Vec<Option<Limb>>,
    pub(crate) joints: Vec<Joint>,
    by_type: BTreeMap<LimbType, LimbId>,
    pub(crate) body_to_limb: BTreeMap<BodyHandle, LimbId>,
    reference: Option<LimbId>,
    pub(crate) lowest: Option<LimbId>,
    mass: f32,
    dir: Direction,

    target_movement: Vec2,
    pub(crate) correction_movement: Vec2,

    pub(crate) in_water: bool,
    pub(crate) head_in_water: bool,
    pub(crate) current_hull: Option<HullId>,
    pub(crate) ignore_platforms: bool,
    pub(crate) stairs: Option<Structure>,
    simple_physics: bool,

    pub(crate) strongest_impact: f32,
    /// Whether the ragdoll takes part in the tick
    pub enabled: bool,
    /// Driven by the local player (enables camera shake)
    pub local_controlled: bool,
    draw_depth: f32,

    pub(crate) config: RagdollConfig,
    pub(crate) pending_events: Vec<RagdollEvent>,
    diagnostics: Vec<DefinitionError>,
}

impl Ragdoll {
    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    /// Build a ragdoll at `position`.
    ///
    /// Problems in the definition are logged and kept in
    /// [`diagnostics`](Self::diagnostics); the offending limb or joint is
    /// skipped and the rest of the ragdoll is still built.
    pub fn new(
        definition: &RagdollDefinition,
        position: Vec2,
        live_ragdolls: usize,
        config: RagdollConfig,
        engine: &mut dyn PhysicsEngine,
    ) -> Self {
        let draw_depth = BASE_DRAW_DEPTH + DRAW_DEPTH_STEP * live_ragdolls as f32;
        let slot_count = definition.limbs.len();

        let mut ragdoll = Self {
            limbs: (0..slot_count).map(|_| None).collect(),
            joints: Vec::with_capacity(definition.joints.len()),
            by_type: BTreeMap::new(),
            body_to_limb: BTreeMap::new(),
            reference: None,
            lowest: None,
            mass: 0.0,
            dir: Direction::Right,
            target_movement: Vec2::ZERO,
            correction_movement: Vec2::ZERO,
            in_water: false,
            head_in_water: false,
            current_hull: None,
            ignore_platforms: false,
            stairs: None,
            simple_physics: false,
            strongest_impact: 0.0,
            enabled: true,
            local_controlled: false,
            draw_depth,
            config,
            pending_events: Vec::new(),
            diagnostics: Vec::new(),
        };

        // 1. Limbs
        for desc in &definition.limbs {
            if desc.id >= slot_count {
                ragdoll.report(DefinitionError::LimbIdOutOfRange { id: desc.id, count: slot_count });
                continue;
            }
            if ragdoll.limbs[desc.id].is_some() {
                ragdoll.report(DefinitionError::DuplicateLimbId(desc.id));
                continue;
            }
            if !(desc.mass.is_finite() && desc.mass > 0.0) {
                ragdoll.report(DefinitionError::InvalidMass { id: desc.id, mass: desc.mass });
                continue;
            }

            let collides_with = if desc.ignore_collisions {
                CollisionGroups::NONE
            } else {
                ragdoll.collision_groups()
            };
            let body_desc = BodyDesc {
                position,
                rotation: 0.0,
                mass: desc.mass,
                shape: desc.shape,
                category: CollisionGroups::CHARACTER,
                collides_with,
            };
            let body = match engine.create_body(&body_desc) {
                Ok(body) => body,
                Err(e) => {
                    ragdoll.report(e.into());
                    continue;
                }
            };

            let limb = Limb::new(desc, body, position, draw_depth);
            ragdoll.mass += limb.mass;
            ragdoll.by_type.entry(limb.limb_type).or_insert(limb.id);
            ragdoll.body_to_limb.insert(body, limb.id);
            ragdoll.limbs[desc.id] = Some(limb);
        }

        // 2. Joints
        for (index, desc) in definition.joints.iter().enumerate() {
            if let Err(e) = ragdoll.add_joint(index, desc, engine) {
                ragdoll.report(e);
            }
        }

        // 3. Reference limb
        ragdoll.reference = ragdoll
            .by_type
            .get(&LimbType::Torso)
            .or_else(|| ragdoll.by_type.get(&LimbType::Head))
            .copied();
        if ragdoll.reference.is_none() {
            ragdoll.report(DefinitionError::MissingReferenceLimb);
        }

        // 4. Push the joint-aligned pose
        ragdoll.flush_to_engine(engine);

        info!(
            "Ragdoll built: {} limbs, {} joints, mass {:.2}",
            ragdoll.limbs().count(),
            ragdoll.joints.len(),
            ragdoll.mass
        );
        ragdoll
    }

    fn add_joint(
        &mut self,
        index: usize,
        desc: &JointDescriptor,
        engine: &mut dyn PhysicsEngine,
    ) -> Result<(), DefinitionError> {
        if desc.limb1 == desc.limb2 {
            return Err(DefinitionError::SelfJoint { joint: index, limb: desc.limb1 });
        }
        let limits = match (desc.lower_limit, desc.upper_limit) {
            (None, None) => None,
            (Some(lower), Some(upper)) if lower <= upper => {
                Some((lower.to_radians(), upper.to_radians()))
            }
            (lower, upper) => {
                return Err(DefinitionError::InvalidJointLimits { joint: index, lower, upper });
            }
        };

        let (body_a, state_a) = match self.limb_slot(desc.limb1) {
            Some(limb) => (limb.body(), *limb.state()),
            None => return Err(DefinitionError::MissingJointLimb { joint: index, limb: desc.limb1 }),
        };
        let body_b = match self.limb_slot(desc.limb2) {
            Some(limb) => limb.body(),
            None => return Err(DefinitionError::MissingJointLimb { joint: index, limb: desc.limb2 }),
        };

        let handle = engine.create_joint(&RevoluteJointDesc {
            body_a,
            body_b,
            anchor_a: desc.anchor1,
            anchor_b: desc.anchor2,
            collide_connected: false,
            limits,
            motor_enabled: true,
            max_motor_torque: MAX_MOTOR_TORQUE,
        })?;

        let joint = Joint::new(
            LimbId(desc.limb1),
            LimbId(desc.limb2),
            handle,
            (desc.anchor1, desc.anchor2),
            limits,
        );

        // Place limb B so both anchors coincide, at the joint's rest angle.
        let rotation_b = state_a.rotation + joint.rest_angle();
        let position_b = state_a.position
            + Vec2::from_angle(state_a.rotation).rotate(desc.anchor1)
            - Vec2::from_angle(rotation_b).rotate(desc.anchor2);
        if let Some(limb) = self.limbs[desc.limb2].as_mut() {
            limb.set_transform(position_b, rotation_b);
        }

        self.joints.push(joint);
        Ok(())
    }

    fn report(&mut self, err: DefinitionError) {
        error!("Ragdoll definition problem: {}", err);
        self.diagnostics.push(err);
    }

    /// Remove every joint and body from the engine.
    ///
    /// All removals are attempted; the first failure is returned.
    pub fn remove(self, engine: &mut dyn PhysicsEngine) -> Result<(), EngineError> {
        let mut first_error = None;

        // Joints before the bodies they connect
        for joint in &self.joints {
            if let Err(e) = engine.remove_joint(joint.handle) {
                warn!("Failed to remove joint {:?}: {}", joint.handle, e);
                first_error.get_or_insert(e);
            }
        }
        for limb in self.limbs.iter().flatten() {
            if let Err(e) = engine.remove_body(limb.body) {
                warn!("Failed to remove limb {:?}: {}", limb.id, e);
                first_error.get_or_insert(e);
            }
        }

        debug!("Ragdoll removed ({} bodies)", self.body_to_limb.len());
        first_error.map_or(Ok(()), Err)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Problems found while building.
    pub fn diagnostics(&self) -> &[DefinitionError] {
        &self.diagnostics
    }

    /// Number of declared limb slots.
    pub fn limb_slots(&self) -> usize {
        self.limbs.len()
    }

    /// Limbs that were built, in ID order.
    pub fn limbs(&self) -> impl Iterator<Item = &Limb> {
        self.limbs.iter().flatten()
    }

    /// Mutable iterator over built limbs.
    pub fn limbs_mut(&mut self) -> impl Iterator<Item = &mut Limb> {
        self.limbs.iter_mut().flatten()
    }

    fn limb_slot(&self, index: usize) -> Option<&Limb> {
        self.limbs.get(index).and_then(Option::as_ref)
    }

    /// Limb by ID.
    pub fn limb_by_id(&self, id: LimbId) -> Option<&Limb> {
        self.limb_slot(id.0)
    }

    /// Mutable limb by ID.
    pub fn limb_by_id_mut(&mut self, id: LimbId) -> Option<&mut Limb> {
        self.limbs.get_mut(id.0).and_then(Option::as_mut)
    }

    /// First limb of a type, in definition order.
    pub fn limb(&self, limb_type: LimbType) -> Option<&Limb> {
        self.by_type.get(&limb_type).and_then(|id| self.limb_by_id(*id))
    }

    /// Limb owning an engine body.
    pub fn limb_for_body(&self, body: BodyHandle) -> Option<LimbId> {
        self.body_to_limb.get(&body).copied()
    }

    /// Joints in creation order.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Relative angle of a joint: limb B rotation minus limb A rotation.
    pub fn joint_angle(&self, index: usize) -> Option<f32> {
        let joint = self.joints.get(index)?;
        let a = self.limb_by_id(joint.limb_a)?;
        let b = self.limb_by_id(joint.limb_b)?;
        Some(b.rotation() - a.rotation())
    }

    /// Limb that anchors the ragdoll (first torso, else first head).
    pub fn reference_limb_id(&self) -> Option<LimbId> {
        self.reference
    }

    /// Reference limb.
    pub fn reference_limb(&self) -> Option<&Limb> {
        self.reference.and_then(|id| self.limb_by_id(id))
    }

    /// Lowest limb as of the last [`find_lowest_limb`](Self::find_lowest_limb).
    pub fn lowest_limb(&self) -> Option<&Limb> {
        self.lowest.and_then(|id| self.limb_by_id(id))
    }

    /// Recompute the limb with the minimum vertical position.
    pub fn find_lowest_limb(&mut self) -> Option<LimbId> {
        self.lowest = self
            .limbs()
            .min_by(|a, b| a.position().y.total_cmp(&b.position().y))
            .map(|l| l.id);
        self.lowest
    }

    /// Total mass of built limbs.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Mass-weighted mean of limb positions.
    pub fn center_of_mass(&self) -> Option<Vec2> {
        if self.mass <= 0.0 {
            return None;
        }
        let weighted = self.limbs().fold(Vec2::ZERO, |acc, l| acc + l.position() * l.mass);
        Some(weighted / self.mass)
    }

    /// Facing direction.
    pub fn dir(&self) -> Direction {
        self.dir
    }

    /// Ragdoll draw depth.
    pub fn draw_depth(&self) -> f32 {
        self.draw_depth
    }

    /// Any limb below a fluid surface.
    pub fn in_water(&self) -> bool {
        self.in_water
    }

    /// Head limb below a fluid surface.
    pub fn head_in_water(&self) -> bool {
        self.head_in_water
    }

    /// Hull the ragdoll is in.
    pub fn current_hull(&self) -> Option<HullId> {
        self.current_hull
    }

    /// Staircase the ragdoll is standing on.
    pub fn stairs(&self) -> Option<&Structure> {
        self.stairs.as_ref()
    }

    /// Configuration.
    pub fn config(&self) -> &RagdollConfig {
        &self.config
    }

    /// Drain events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<RagdollEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Strongest impact since the last drain.
    pub fn strongest_impact(&self) -> f32 {
        self.strongest_impact
    }

    /// Read and reset the strongest impact.
    pub fn take_strongest_impact(&mut self) -> f32 {
        std::mem::take(&mut self.strongest_impact)
    }

    // =========================================================================
    // MOVEMENT
    // =========================================================================

    /// Set the movement target. Non-finite input is ignored; components are
    /// clamped to the configured maximum.
    pub fn set_target_movement(&mut self, movement: Vec2) {
        if !movement.is_finite() {
            warn!("Ignoring non-finite target movement {:?}", movement);
            return;
        }
        self.target_movement = clamp_components(movement, self.config.max_target_movement());
    }

    /// Movement target as set by the controller.
    pub fn target_movement(&self) -> Vec2 {
        self.target_movement
    }

    /// Network correction applied on top of the movement target.
    pub fn correction_movement(&self) -> Vec2 {
        self.correction_movement
    }

    /// Correction when one is active, otherwise the movement target.
    pub fn effective_target_movement(&self) -> Vec2 {
        if self.correction_movement != Vec2::ZERO {
            self.correction_movement
        } else {
            self.target_movement
        }
    }

    // =========================================================================
    // MODES
    // =========================================================================

    /// Whether only the reference limb is simulated.
    pub fn simple_physics(&self) -> bool {
        self.simple_physics
    }

    /// Collapse the ragdoll to its reference limb, or restore it.
    pub fn set_simple_physics(&mut self, enabled: bool, engine: &mut dyn PhysicsEngine) {
        if self.simple_physics == enabled {
            return;
        }
        self.simple_physics = enabled;

        for joint in &self.joints {
            if let Err(e) = engine.set_joint_enabled(joint.handle, !enabled) {
                warn!("Failed to toggle joint {:?}: {}", joint.handle, e);
            }
        }
        for limb in self.limbs.iter().flatten() {
            let active = !enabled || Some(limb.id) == self.reference;
            if let Err(e) = engine.set_body_enabled(limb.body, active) {
                warn!("Failed to toggle limb {:?}: {}", limb.id, e);
            }
        }
        debug!("Simple physics {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Whether one-way platforms are ignored.
    pub fn ignore_platforms(&self) -> bool {
        self.ignore_platforms
    }

    /// Ignore or collide with one-way platforms.
    pub fn set_ignore_platforms(&mut self, ignore: bool, engine: &mut dyn PhysicsEngine) {
        if self.ignore_platforms == ignore {
            return;
        }
        self.ignore_platforms = ignore;
        self.update_collision_categories(engine);
    }

    /// Categories limbs collide with in the current state.
    pub fn collision_groups(&self) -> CollisionGroups {
        let mut groups = CollisionGroups::WALL | CollisionGroups::PROJECTILE | CollisionGroups::STAIRS;
        if self.current_hull.is_none() {
            groups = groups | CollisionGroups::LEVEL;
        }
        if !self.ignore_platforms {
            groups = groups | CollisionGroups::PLATFORM;
        }
        groups
    }

    /// Push the current collision categories to every colliding limb.
    ///
    /// A limb the engine refuses keeps its previous filter.
    pub fn update_collision_categories(&mut self, engine: &mut dyn PhysicsEngine) {
        let groups = self.collision_groups();
        for limb in self.limbs.iter().flatten().filter(|l| !l.ignore_collisions) {
            if let Err(e) = engine.set_collides_with(limb.body, groups) {
                error!("Failed to update collision categories of limb {:?}: {}", limb.id, e);
            }
        }
    }

    /// Release every pull-target anchor.
    pub fn reset_pull_joints(&mut self) {
        for limb in self.limbs.iter_mut().flatten() {
            limb.pull_anchor = None;
        }
    }

    // =========================================================================
    // ORIENTATION
    // =========================================================================

    /// Mirror the ragdoll horizontally.
    ///
    /// Flipping twice restores every joint, anchor and sprite origin.
    pub fn flip(&mut self, engine: &mut dyn PhysicsEngine) {
        self.dir = self.dir.flipped();

        for joint in &mut self.joints {
            joint.mirror();
            let (anchor_a, anchor_b) = joint.anchors();
            if let Err(e) = engine.set_joint_limits(joint.handle, joint.limits()) {
                warn!("Failed to mirror limits of joint {:?}: {}", joint.handle, e);
            }
            if let Err(e) = engine.set_joint_anchors(joint.handle, anchor_a, anchor_b) {
                warn!("Failed to mirror anchors of joint {:?}: {}", joint.handle, e);
            }
        }

        let sign = self.dir.sign();
        for limb in self.limbs.iter_mut().flatten() {
            limb.sprite_origin.x = limb.sprite_width - limb.sprite_origin.x;
            limb.dir = sign;
            if let Some(anchor) = limb.pull_anchor.as_mut() {
                anchor.x = -anchor.x;
            }
        }
        debug!("Ragdoll flipped to {:?}", self.dir);
    }

    // =========================================================================
    // ENGINE SYNC
    // =========================================================================

    /// Refresh limb mirrors from the engine.
    pub fn sync_from_engine(&mut self, engine: &dyn PhysicsEngine) {
        for limb in self.limbs.iter_mut().flatten() {
            if let Some(state) = engine.body_state(limb.body) {
                limb.sync(state);
            }
        }
    }

    /// Push mirror writes (teleports, velocity overwrites, forces) to the engine.
    pub fn flush_to_engine(&mut self, engine: &mut dyn PhysicsEngine) {
        for limb in self.limbs.iter_mut().flatten() {
            let body = limb.body;
            let writes = limb.take_pending();
            let results = [
                writes.transform.map(|(p, r)| engine.set_transform(body, p, r)),
                writes.velocity.map(|(v, w)| engine.set_velocity(body, v, w)),
                writes.force.map(|f| engine.apply_force(body, f)),
            ];
            for result in results.into_iter().flatten() {
                if let Err(e) = result {
                    warn!("Failed to update limb {:?}: {}", limb.id, e);
                }
            }
        }
    }

    /// Per-tick limb bookkeeping.
    pub fn update_limbs(&mut self, dt: f32) {
        for limb in self.limbs.iter_mut().flatten() {
            limb.update(dt);
        }
    }

    pub(crate) fn push_event(&mut self, event: RagdollEvent) {
        self.pending_events.push(event);
    }
}
