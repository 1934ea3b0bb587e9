//! Protocol Messages
//!
//! Wire format of authoritative ragdoll state. Messages serialize as JSON
//! for debugging ease, with binary (bincode) for production.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::warn;

use crate::ragdoll::{LimbId, LimbTarget, Ragdoll};

/// Problems applying a received state update.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// Update names a limb the ragdoll does not have.
    #[error("unknown limb {0:?}")]
    UnknownLimb(LimbId),

    /// Update carries NaN or infinite values.
    #[error("non-finite state for limb {0:?}")]
    NonFinite(LimbId),

    /// Ragdoll has no reference limb to reconcile against.
    #[error("ragdoll has no reference limb")]
    NoReferenceLimb,

    /// Update carries no entry for the reference limb.
    #[error("no state for reference limb {0:?}")]
    MissingReferenceEntry(LimbId),
}

/// Authoritative state of one limb.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimbStateEntry {
    /// Limb
    pub limb: LimbId,
    /// Server state
    pub target: LimbTarget,
}

/// Authoritative state of a ragdoll at a server tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagdollStateUpdate {
    /// Server tick the state was captured at
    pub tick: u32,
    /// Per-limb state
    pub limbs: Vec<LimbStateEntry>,
}

impl RagdollStateUpdate {
    /// Capture the current state of every limb (server side).
    pub fn capture(tick: u32, ragdoll: &Ragdoll) -> Self {
        Self {
            tick,
            limbs: ragdoll
                .limbs()
                .map(|l| LimbStateEntry { limb: l.id, target: LimbTarget::from_state(l.state()) })
                .collect(),
        }
    }

    /// Store the update as pending limb targets (client side).
    ///
    /// The whole update is validated first; a rejected update leaves every
    /// limb untouched. Returns the number of limbs that received a target.
    pub fn apply(&self, ragdoll: &mut Ragdoll) -> Result<usize, NetworkError> {
        let reference = ragdoll.reference_limb().map(|l| l.id).ok_or(NetworkError::NoReferenceLimb)?;
        if !self.limbs.iter().any(|e| e.limb == reference) {
            warn!("State update {} has no entry for reference limb {:?}", self.tick, reference);
            return Err(NetworkError::MissingReferenceEntry(reference));
        }
        for entry in &self.limbs {
            if ragdoll.limb_by_id(entry.limb).is_none() {
                warn!("State update {} names unknown limb {:?}", self.tick, entry.limb);
                return Err(NetworkError::UnknownLimb(entry.limb));
            }
            if !entry.target.is_finite() {
                warn!("State update {} has non-finite limb {:?}", self.tick, entry.limb);
                return Err(NetworkError::NonFinite(entry.limb));
            }
        }

        let mut applied = 0;
        for entry in &self.limbs {
            if let Some(limb) = ragdoll.limb_by_id_mut(entry.limb) {
                limb.set_target(entry.target);
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize to binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::core::config::RagdollConfig;
    use crate::physics::SandboxWorld;
    use crate::ragdoll::testing::humanoid;

    fn ragdoll() -> Ragdoll {
        let mut world = SandboxWorld::default();
        Ragdoll::new(&humanoid(), Vec2::new(1.0, 2.0), 0, RagdollConfig::default(), &mut world)
    }

    #[test]
    fn test_capture_and_apply() {
        let server = ragdoll();
        let update = RagdollStateUpdate::capture(42, &server);
        assert_eq!(update.limbs.len(), 4);

        let mut client = ragdoll();
        assert_eq!(update.apply(&mut client), Ok(4));
        for limb in client.limbs() {
            let expected = server.limb_by_id(limb.id).unwrap().position();
            assert_eq!(limb.target().unwrap().position, expected);
        }
    }

    #[test]
    fn test_unknown_limb_rejected_whole() {
        let mut update = RagdollStateUpdate::capture(1, &ragdoll());
        update.limbs.push(LimbStateEntry { limb: LimbId(99), target: LimbTarget::default() });

        let mut client = ragdoll();
        assert_eq!(update.apply(&mut client), Err(NetworkError::UnknownLimb(LimbId(99))));
        assert!(client.limbs().all(|l| !l.has_target()));
    }

    #[test]
    fn test_missing_reference_entry_rejected_whole() {
        let mut update = RagdollStateUpdate::capture(1, &ragdoll());
        update.limbs.retain(|e| e.limb != LimbId(0));

        let mut client = ragdoll();
        assert_eq!(update.apply(&mut client), Err(NetworkError::MissingReferenceEntry(LimbId(0))));
        assert!(client.limbs().all(|l| !l.has_target()));
    }

    #[test]
    fn test_subset_with_reference_accepted() {
        let mut update = RagdollStateUpdate::capture(1, &ragdoll());
        update.limbs.retain(|e| e.limb == LimbId(0) || e.limb == LimbId(2));
        assert_eq!(update.apply(&mut ragdoll()), Ok(2));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut update = RagdollStateUpdate::capture(1, &ragdoll());
        update.limbs[1].target.linear_velocity = Vec2::new(f32::INFINITY, 0.0);
        assert_eq!(update.apply(&mut ragdoll()), Err(NetworkError::NonFinite(LimbId(1))));
    }

    #[test]
    fn test_json_wire_format() {
        let update = RagdollStateUpdate::capture(7, &ragdoll());
        let json = update.to_json().unwrap();
        assert!(json.contains("\"tick\":7"));
        assert_eq!(RagdollStateUpdate::from_json(&json).unwrap(), update);
    }

    #[test]
    fn test_binary_wire_format() {
        let update = RagdollStateUpdate::capture(7, &ragdoll());
        let bytes = update.to_bytes().unwrap();
        assert_eq!(RagdollStateUpdate::from_bytes(&bytes).unwrap(), update);
    }
}
