//! Simulation Context
//!
//! Owns every live ragdoll of a level and routes engine contacts back to the
//! ragdoll that owns the touching body. Ragdolls are kept in a `BTreeMap` so
//! per-tick updates and event order are deterministic.

pub mod tick;

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::core::config::RagdollConfig;
use crate::core::error::EngineError;
use crate::physics::{BodyHandle, Contact, ContactListener, PhysicsEngine};
use crate::ragdoll::{Ragdoll, RagdollDefinition, RagdollEvent};

pub use tick::{tick, TickResult};

/// Identifier of a ragdoll within a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RagdollId(pub u32);

/// An event with its tick and source ragdoll.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    /// Tick when the event occurred
    pub tick: u32,
    /// Ragdoll that produced it
    pub ragdoll: RagdollId,
    /// Event data
    pub event: RagdollEvent,
}

/// All ragdolls of a level.
#[derive(Debug)]
pub struct SimulationContext {
    /// Ticks simulated so far
    pub tick: u32,
    config: RagdollConfig,
    ragdolls: BTreeMap<RagdollId, Ragdoll>,
    body_owner: BTreeMap<BodyHandle, RagdollId>,
    pending_removals: BTreeSet<RagdollId>,
    controlled: Option<RagdollId>,
    next_id: u32,
}

impl SimulationContext {
    /// Create an empty context. New ragdolls get a copy of `config`.
    pub fn new(config: RagdollConfig) -> Self {
        Self {
            tick: 0,
            config,
            ragdolls: BTreeMap::new(),
            body_owner: BTreeMap::new(),
            pending_removals: BTreeSet::new(),
            controlled: None,
            next_id: 0,
        }
    }

    /// Configuration given to new ragdolls.
    pub fn config(&self) -> &RagdollConfig {
        &self.config
    }

    /// Build a ragdoll and register its bodies.
    pub fn spawn(
        &mut self,
        definition: &RagdollDefinition,
        position: Vec2,
        engine: &mut dyn PhysicsEngine,
    ) -> RagdollId {
        let id = RagdollId(self.next_id);
        self.next_id += 1;

        let ragdoll = Ragdoll::new(definition, position, self.ragdolls.len(), self.config.clone(), engine);
        for limb in ragdoll.limbs() {
            self.body_owner.insert(limb.body(), id);
        }
        info!("Spawned ragdoll {:?} at {:?}", id, position);
        self.ragdolls.insert(id, ragdoll);
        id
    }

    /// Remove a ragdoll now, releasing its engine resources.
    ///
    /// Returns `None` for an unknown ID.
    pub fn remove(&mut self, id: RagdollId, engine: &mut dyn PhysicsEngine) -> Option<Result<(), EngineError>> {
        let ragdoll = self.ragdolls.remove(&id)?;
        self.body_owner.retain(|_, owner| *owner != id);
        self.pending_removals.remove(&id);
        if self.controlled == Some(id) {
            self.controlled = None;
        }
        debug!("Removing ragdoll {:?}", id);
        Some(ragdoll.remove(engine))
    }

    /// Remove a ragdoll at the end of the next tick.
    pub fn request_removal(&mut self, id: RagdollId) {
        if self.ragdolls.contains_key(&id) {
            self.pending_removals.insert(id);
        }
    }

    /// Mark the ragdoll driven by the local player.
    pub fn set_controlled(&mut self, id: Option<RagdollId>) {
        self.controlled = id.filter(|id| self.ragdolls.contains_key(id));
        for (rid, ragdoll) in &mut self.ragdolls {
            ragdoll.local_controlled = Some(*rid) == self.controlled;
        }
    }

    /// Ragdoll driven by the local player.
    pub fn controlled(&self) -> Option<RagdollId> {
        self.controlled
    }

    /// Look up a ragdoll.
    pub fn get(&self, id: RagdollId) -> Option<&Ragdoll> {
        self.ragdolls.get(&id)
    }

    /// Look up a ragdoll mutably.
    pub fn get_mut(&mut self, id: RagdollId) -> Option<&mut Ragdoll> {
        self.ragdolls.get_mut(&id)
    }

    /// Ragdolls in ID order.
    pub fn ragdolls(&self) -> impl Iterator<Item = (RagdollId, &Ragdoll)> {
        self.ragdolls.iter().map(|(id, r)| (*id, r))
    }

    /// Number of live ragdolls.
    pub fn len(&self) -> usize {
        self.ragdolls.len()
    }

    /// Whether no ragdoll is live.
    pub fn is_empty(&self) -> bool {
        self.ragdolls.is_empty()
    }

    /// Ragdoll owning an engine body.
    pub fn owner_of(&self, body: BodyHandle) -> Option<RagdollId> {
        self.body_owner.get(&body).copied()
    }
}

/// Routes contacts to the ragdoll owning the body.
struct ContactDispatch<'a> {
    ragdolls: &'a mut BTreeMap<RagdollId, Ragdoll>,
    body_owner: &'a BTreeMap<BodyHandle, RagdollId>,
}

impl ContactListener for ContactDispatch<'_> {
    fn on_contact(&mut self, contact: &Contact) -> bool {
        let owner = self.body_owner.get(&contact.body);
        match owner.and_then(|id| self.ragdolls.get_mut(id)) {
            Some(ragdoll) => ragdoll.on_contact(contact),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::SandboxWorld;
    use crate::ragdoll::testing::humanoid;

    #[test]
    fn test_spawn_and_remove() {
        let mut world = SandboxWorld::default();
        let mut ctx = SimulationContext::new(RagdollConfig::default());
        let a = ctx.spawn(&humanoid(), Vec2::ZERO, &mut world);
        let b = ctx.spawn(&humanoid(), Vec2::new(5.0, 0.0), &mut world);
        assert_ne!(a, b);
        assert_eq!(ctx.len(), 2);
        assert_eq!(world.body_count(), 8);

        // Second ragdoll draws on top of the first
        assert!(ctx.get(b).unwrap().draw_depth() > ctx.get(a).unwrap().draw_depth());

        let body = ctx.get(a).unwrap().reference_limb().unwrap().body();
        assert_eq!(ctx.owner_of(body), Some(a));

        assert_eq!(ctx.remove(a, &mut world), Some(Ok(())));
        assert_eq!(ctx.owner_of(body), None);
        assert_eq!(world.body_count(), 4);
        assert!(ctx.remove(a, &mut world).is_none());
    }

    #[test]
    fn test_controlled() {
        let mut world = SandboxWorld::default();
        let mut ctx = SimulationContext::new(RagdollConfig::default());
        let a = ctx.spawn(&humanoid(), Vec2::ZERO, &mut world);
        let b = ctx.spawn(&humanoid(), Vec2::ZERO, &mut world);

        ctx.set_controlled(Some(b));
        assert!(!ctx.get(a).unwrap().local_controlled);
        assert!(ctx.get(b).unwrap().local_controlled);

        ctx.remove(b, &mut world);
        assert_eq!(ctx.controlled(), None);
    }
}
