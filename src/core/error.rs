//! Error Types
//!
//! Every error in the core is non-fatal to the simulation: definition
//! problems skip the offending entry, engine failures leave the previous
//! state in place.

use thiserror::Error;

use crate::physics::{BodyHandle, JointHandle};

/// Problems found while building a ragdoll from its definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Definition document could not be decoded.
    #[error("failed to parse ragdoll definition: {0}")]
    Parse(#[from] serde_json::Error),

    /// Declared limb index does not fit the limb array.
    #[error("limb id {id} is out of range (limb count {count})")]
    LimbIdOutOfRange {
        /// Declared index
        id: usize,
        /// Number of limb slots
        count: usize,
    },

    /// Two limbs declared the same index.
    #[error("duplicate limb id {0}")]
    DuplicateLimbId(usize),

    /// Limb mass must be finite and positive.
    #[error("limb {id} has invalid mass {mass}")]
    InvalidMass {
        /// Limb index
        id: usize,
        /// Offending mass
        mass: f32,
    },

    /// Joint names a limb that was never placed.
    #[error("joint {joint} references missing limb {limb}")]
    MissingJointLimb {
        /// Joint index in the definition
        joint: usize,
        /// Missing limb index
        limb: usize,
    },

    /// Joint connects a limb to itself.
    #[error("joint {joint} connects limb {limb} to itself")]
    SelfJoint {
        /// Joint index in the definition
        joint: usize,
        /// Limb index
        limb: usize,
    },

    /// Only one side of the limit pair was given, or lower > upper.
    #[error("joint {joint} has invalid limits ({lower:?}, {upper:?})")]
    InvalidJointLimits {
        /// Joint index in the definition
        joint: usize,
        /// Lower limit in degrees
        lower: Option<f32>,
        /// Upper limit in degrees
        upper: Option<f32>,
    },

    /// No torso or head limb to anchor the ragdoll.
    #[error("ragdoll has no torso or head limb")]
    MissingReferenceLimb,

    /// The engine refused to create a body or joint.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Failures reported by a physics engine implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Body handle is not registered.
    #[error("unknown body {0:?}")]
    UnknownBody(BodyHandle),

    /// Joint handle is not registered.
    #[error("unknown joint {0:?}")]
    UnknownJoint(JointHandle),

    /// Body description is not usable (bad mass, bad shape).
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The engine rejected the mutation.
    #[error("engine rejected operation: {0}")]
    Rejected(String),
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Value outside its allowed range.
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: f32,
        /// Inclusive lower bound
        min: f32,
        /// Inclusive upper bound
        max: f32,
    },

    /// Two related fields disagree.
    #[error("{0}")]
    Inconsistent(String),

    /// Environment variable could not be parsed.
    #[error("environment variable {var} has invalid value {value:?}")]
    InvalidEnv {
        /// Variable name
        var: String,
        /// Raw value
        value: String,
    },
}
