//! Network Layer
//!
//! Authoritative ragdoll state on the wire, and client-side reconciliation
//! against it. Transport is left to the host game.

pub mod protocol;
pub mod reconcile;

pub use protocol::{LimbStateEntry, NetworkError, RagdollStateUpdate};
pub use reconcile::{reconcile, ReconcileOutcome};
