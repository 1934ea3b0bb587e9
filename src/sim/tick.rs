//! Simulation Tick
//!
//! One fixed step of every ragdoll in a context plus one engine step.

use std::collections::BTreeMap;

use glam::Vec2;
use tracing::{trace, warn};

use crate::environment::Environment;
use crate::network::reconcile;
use crate::physics::PhysicsEngine;
use crate::sim::{ContactDispatch, RagdollId, SimEvent, SimulationContext};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, by priority then ragdoll
    pub events: Vec<SimEvent>,
    /// Ragdolls removed at the end of the tick
    pub removed: Vec<RagdollId>,
}

/// Run one simulation tick.
///
/// # Arguments
///
/// * `ctx` - The ragdolls (will be mutated)
/// * `engine` - Physics engine, stepped once
/// * `env` - Hulls and gaps
/// * `inputs` - Movement targets for this tick (BTreeMap for deterministic order)
/// * `dt` - Step length in seconds
pub fn tick(
    ctx: &mut SimulationContext,
    engine: &mut dyn PhysicsEngine,
    env: &mut dyn Environment,
    inputs: &BTreeMap<RagdollId, Vec2>,
    dt: f32,
) -> TickResult {
    let mut result = TickResult::default();

    // 0. Advance tick counter
    ctx.tick += 1;

    // 1. Apply movement inputs
    for (id, movement) in inputs {
        match ctx.ragdolls.get_mut(id) {
            Some(ragdoll) => ragdoll.set_target_movement(*movement),
            None => warn!("Input for unknown ragdoll {:?}", id),
        }
    }

    for ragdoll in ctx.ragdolls.values_mut().filter(|r| r.enabled) {
        // 2. Pull toward the authoritative state
        if !ragdoll.config().authoritative {
            reconcile(ragdoll);
        }

        // 3. Terrain and hull tracking
        ragdoll.find_lowest_limb();
        if ragdoll.find_hull(&*env) {
            ragdoll.update_collision_categories(engine);
        }

        // 4. Submersion, flow and splashes
        ragdoll.update_buoyancy(env);

        // 5. Push mirror writes
        ragdoll.flush_to_engine(engine);
    }

    // 6. Step the engine; contacts are classified by their owning ragdoll
    let mut dispatch = ContactDispatch { ragdolls: &mut ctx.ragdolls, body_owner: &ctx.body_owner };
    engine.step(dt, &mut dispatch);

    // 7. Refresh mirrors and limb timers
    for ragdoll in ctx.ragdolls.values_mut() {
        ragdoll.sync_from_engine(&*engine);
        ragdoll.update_limbs(dt);
    }

    // 8. Collect events
    let now = ctx.tick;
    for (id, ragdoll) in &mut ctx.ragdolls {
        result.events.extend(ragdoll.take_events().into_iter().map(|event| SimEvent {
            tick: now,
            ragdoll: *id,
            event,
        }));
    }
    result.events.sort_by_key(|e| e.event.priority());

    // 9. Deferred removals
    for id in std::mem::take(&mut ctx.pending_removals) {
        if let Some(Err(e)) = ctx.remove(id, engine) {
            warn!("Ragdoll {:?} removed with errors: {}", id, e);
        }
        result.removed.push(id);
    }

    trace!("Tick {} done: {} events", ctx.tick, result.events.len());
    result
}
