//! # Ragdoll Simulation Core
//!
//! Articulated ragdolls on top of an external 2D rigid-body engine: limb and
//! joint assembly, terrain-aware contact filtering, buoyancy in flooded
//! hulls, and client-side reconciliation against server state.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RAGDOLL SIMULATION                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Shared primitives                         │
//! │  ├── config.rs   - Tunables, env overrides, validation       │
//! │  ├── error.rs    - Error types                               │
//! │  └── math.rs     - Vector helpers and rectangles             │
//! │                                                              │
//! │  physics/        - Engine interface                          │
//! │  ├── mod.rs      - Handles, descriptions, contacts, trait    │
//! │  └── sandbox.rs  - In-memory engine for tests and demos      │
//! │                                                              │
//! │  environment/    - Level queries                             │
//! │  ├── hull.rs     - Hulls, fluid surfaces, gaps               │
//! │  └── structure.rs- Platforms and staircases                  │
//! │                                                              │
//! │  ragdoll/        - Ragdoll core                              │
//! │  ├── assembly.rs - Construction, lifecycle, flip, modes      │
//! │  ├── terrain.rs  - Contact classification                    │
//! │  ├── impact.rs   - Damage, sound and camera feedback         │
//! │  └── buoyancy.rs - Submersion, flow, splashes                │
//! │                                                              │
//! │  network/        - Authoritative state                       │
//! │  ├── protocol.rs - State update messages                     │
//! │  └── reconcile.rs- Client-side correction                    │
//! │                                                              │
//! │  sim/            - Context and tick loop                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Engine Boundary
//!
//! The engine only ever sees handles. Limb state is mirrored after each
//! step and written back before the next one, so contact callbacks never
//! create or remove engine objects.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod environment;
pub mod network;
pub mod physics;
pub mod ragdoll;
pub mod sim;

// Re-export commonly used types
pub use crate::core::{ConfigError, DefinitionError, EngineError, NetConfig, RagdollConfig, Rect};
pub use environment::{Environment, HullId, HullMap, Structure};
pub use physics::{PhysicsEngine, SandboxWorld};
pub use ragdoll::{LimbId, LimbType, Ragdoll, RagdollDefinition, RagdollEvent};
pub use sim::{RagdollId, SimulationContext};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
