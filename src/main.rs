//! Ragdoll Simulation Demo
//!
//! Drops two ragdolls into a half-flooded hull and logs what happens.
//! Set `RUST_LOG` to change verbosity and `RAGDOLL_*` to override tunables.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use glam::Vec2;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ragdoll::{
    TICK_RATE, VERSION,
    environment::{Gap, Hull, HullId, HullMap},
    network::RagdollStateUpdate,
    physics::SandboxWorld,
    ragdoll::RagdollDefinition,
    sim::{tick, SimulationContext},
    RagdollConfig, Rect,
};

const HUMANOID: &str = r#"{
    "limbs": [
        { "id": 0, "type": "Torso", "mass": 10.0, "shape": { "kind": "rect", "width": 0.3, "height": 0.6 } },
        { "id": 1, "type": "Head", "mass": 4.0, "shape": { "kind": "circle", "radius": 0.15 }, "impact_tolerance": 5.0 },
        { "id": 2, "type": "LeftFoot", "mass": 1.0, "shape": { "kind": "capsule", "radius": 0.05, "height": 0.2 } },
        { "id": 3, "type": "RightFoot", "mass": 1.0, "shape": { "kind": "capsule", "radius": 0.05, "height": 0.2 } }
    ],
    "joints": [
        { "limb1": 0, "limb2": 1, "anchor1": [0.0, 0.35], "anchor2": [0.0, -0.1], "lower_limit": -20.0, "upper_limit": 40.0 },
        { "limb1": 0, "limb2": 2, "anchor1": [-0.1, -0.35], "anchor2": [0.0, 0.1], "lower_limit": -45.0, "upper_limit": 45.0 },
        { "limb1": 0, "limb2": 3, "anchor1": [0.1, -0.35], "anchor2": [0.0, 0.1], "lower_limit": -45.0, "upper_limit": 45.0 }
    ]
}"#;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    info!("Ragdoll Simulation v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let config = RagdollConfig::from_env().context("invalid RAGDOLL_* configuration")?;
    let definition = RagdollDefinition::from_json(HUMANOID).context("invalid ragdoll definition")?;

    demo(config, &definition)
}

/// Run a few seconds of simulation.
fn demo(config: RagdollConfig, definition: &RagdollDefinition) -> Result<()> {
    info!("=== Starting Demo ===");

    let mut world = SandboxWorld::default();
    let mut level = HullMap::new();
    let mut hull = Hull::new(HullId(0), Rect::new(-10.0, 10.0, 20.0, 10.0), config.wave_width());
    hull.fill_fraction(0.3);
    level.insert_hull(hull);
    level.add_gap(Gap {
        position: Vec2::new(-9.5, 1.0),
        flow_force: Vec2::new(40.0, 0.0),
        flow_target: Some(HullId(0)),
    });

    let mut ctx = SimulationContext::new(config);
    let player = ctx.spawn(definition, Vec2::new(-2.0, 8.0), &mut world);
    let npc = ctx.spawn(definition, Vec2::new(3.0, 6.0), &mut world);
    ctx.set_controlled(Some(player));

    let dt = 1.0 / TICK_RATE as f32;
    let inputs = BTreeMap::from([(player, Vec2::new(1.0, 0.0)), (npc, Vec2::new(-1.0, 0.0))]);
    let mut total_events = 0;

    for t in 0..TICK_RATE * 3 {
        let result = tick(&mut ctx, &mut world, &mut level, &inputs, dt);
        for event in &result.events {
            info!("tick {} ragdoll {:?}: {:?}", event.tick, event.ragdoll, event.event);
        }
        total_events += result.events.len();

        if t % TICK_RATE == 0 {
            for (id, ragdoll) in ctx.ragdolls() {
                let com = ragdoll.center_of_mass().unwrap_or_default();
                info!(
                    "ragdoll {:?} com ({:.2}, {:.2}) in water: {} strongest impact: {:.2}",
                    id,
                    com.x,
                    com.y,
                    ragdoll.in_water(),
                    ragdoll.strongest_impact()
                );
            }
        }
    }

    let snapshot = ctx
        .get(npc)
        .map(|r| RagdollStateUpdate::capture(ctx.tick, r))
        .context("npc ragdoll missing")?;
    let bytes = snapshot.to_bytes().context("failed to encode state update")?;
    info!("State update for {:?}: {} limbs, {} bytes", npc, snapshot.limbs.len(), bytes.len());

    info!("=== Demo Complete ===");
    info!("Ticks: {}, events: {}", ctx.tick, total_events);
    Ok(())
}
