//! Ragdoll Core
//!
//! Limbs, joints and the assembly that owns them, plus the per-contact and
//! per-tick behavior layered on top:
//! - [`terrain`]: which contacts the engine resolves
//! - [`impact`]: damage and feedback from accepted contacts
//! - [`buoyancy`]: submersion, gap flow and splashes

pub mod assembly;
pub mod buoyancy;
pub mod definition;
pub mod events;
pub mod impact;
pub mod joint;
pub mod limb;
pub mod terrain;

#[cfg(test)]
pub(crate) mod testing;

pub use assembly::{Direction, Ragdoll};
pub use definition::{JointDescriptor, LimbDescriptor, RagdollDefinition};
pub use events::{EventPriority, ParticleKind, RagdollEvent};
pub use joint::Joint;
pub use limb::{Limb, LimbId, LimbTarget, LimbType};
