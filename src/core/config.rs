//! Simulation Configuration
//!
//! Typed tunables for the ragdoll core. Every field has a default, can be
//! overridden from `RAGDOLL_*` environment variables, and is clamped to its
//! allowed range when assigned through a setter.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::ConfigError;

// =============================================================================
// RANGES
// =============================================================================

/// Inclusive range for a tunable.
#[derive(Clone, Copy, Debug)]
struct Range {
    field: &'static str,
    min: f32,
    max: f32,
}

impl Range {
    const fn new(field: &'static str, min: f32, max: f32) -> Self {
        Self { field, min, max }
    }

    fn clamp(&self, value: f32) -> f32 {
        if !value.is_finite() {
            warn!("{} = {} is not finite, using {}", self.field, value, self.min);
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    fn check(&self, value: f32) -> Result<(), ConfigError> {
        if value.is_finite() && value >= self.min && value <= self.max {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange {
                field: self.field,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

const ALLOWED_DISTANCE: Range = Range::new("allowed_distance", 0.0, 10.0);
const RESET_DISTANCE: Range = Range::new("reset_distance", 0.0, 100.0);
const CORRECTION_BLEND: Range = Range::new("correction_blend", 0.0, 1.0);
const IMPACT_SCALE: Range = Range::new("authoritative_impact_scale", 0.0, 1.0);
const HIT_SOUND_COOLDOWN: Range = Range::new("hit_sound_cooldown", 0.0, 10.0);
const MAX_TARGET_MOVEMENT: Range = Range::new("max_target_movement", 0.0, 100.0);
const WAVE_WIDTH: Range = Range::new("wave_width", 0.01, 10.0);
const FLOW_FORCE_DIVISOR: Range = Range::new("flow_force_divisor", 1.0, 100_000.0);

// =============================================================================
// NETWORK RECONCILIATION
// =============================================================================

/// Tunables for client-side limb reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Divergence below this distance is accepted as noise.
    allowed_distance: f32,
    /// Divergence above this distance snaps every limb to its target.
    reset_distance: f32,
    /// Multiplier on `allowed_distance` while the ragdoll is in fluid.
    pub fluid_allowance_multiplier: f32,
    /// Lerp factor between the movement target and the correction.
    correction_blend: f32,
    /// Distance-to-speed gain of the correction vector.
    pub correction_gain: f32,
    /// Minimum correction speed.
    pub min_correction: f32,
    /// Maximum correction speed.
    pub max_correction: f32,
    /// Vertical correction below this is dropped while on land.
    pub vertical_deadzone: f32,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            allowed_distance: 0.1,
            reset_distance: 3.0,
            fluid_allowance_multiplier: 2.0,
            correction_blend: 0.2,
            correction_gain: 5.0,
            min_correction: 0.1,
            max_correction: 5.0,
            vertical_deadzone: 0.1,
        }
    }
}

impl NetConfig {
    /// Allowed divergence on land.
    pub fn allowed_distance(&self) -> f32 {
        self.allowed_distance
    }

    /// Hard reset distance.
    pub fn reset_distance(&self) -> f32 {
        self.reset_distance
    }

    /// Blend factor toward the correction vector.
    pub fn correction_blend(&self) -> f32 {
        self.correction_blend
    }

    /// Set the allowed divergence (clamped).
    pub fn set_allowed_distance(&mut self, value: f32) {
        self.allowed_distance = ALLOWED_DISTANCE.clamp(value);
    }

    /// Set the hard reset distance (clamped).
    pub fn set_reset_distance(&mut self, value: f32) {
        self.reset_distance = RESET_DISTANCE.clamp(value);
    }

    /// Set the correction blend factor (clamped to [0, 1]).
    pub fn set_correction_blend(&mut self, value: f32) {
        self.correction_blend = CORRECTION_BLEND.clamp(value);
    }

    /// Allowed divergence given the current submersion state.
    pub fn allowed_for(&self, in_fluid: bool) -> f32 {
        if in_fluid {
            self.allowed_distance * self.fluid_allowance_multiplier
        } else {
            self.allowed_distance
        }
    }

    /// Check all fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ALLOWED_DISTANCE.check(self.allowed_distance)?;
        RESET_DISTANCE.check(self.reset_distance)?;
        CORRECTION_BLEND.check(self.correction_blend)?;
        if self.min_correction > self.max_correction {
            return Err(ConfigError::Inconsistent(format!(
                "min_correction {} exceeds max_correction {}",
                self.min_correction, self.max_correction
            )));
        }
        if self.allowed_distance > self.reset_distance {
            return Err(ConfigError::Inconsistent(format!(
                "allowed_distance {} exceeds reset_distance {}",
                self.allowed_distance, self.reset_distance
            )));
        }
        Ok(())
    }
}

// =============================================================================
// RAGDOLL
// =============================================================================

/// Tunables for collision response, buoyancy and terrain handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagdollConfig {
    /// Running as the authoritative (server) simulation.
    pub authoritative: bool,
    /// Impact multiplier applied in authoritative mode.
    ///
    /// Netcode compensation carried over from the shipped game; its intent
    /// is unconfirmed, so it stays a tunable.
    authoritative_impact_scale: f32,
    /// Impacts below this never play a hit sound.
    pub hit_sound_floor: f32,
    /// Seconds between hit sounds of the same limb.
    hit_sound_cooldown: f32,
    /// Movement target components are clamped to this magnitude.
    max_target_movement: f32,
    /// Upward intent below which a character is not climbing stairs.
    pub stairs_climb_intent: f32,
    /// Distance above a staircase bottom that counts as "below" it.
    pub stairs_bottom_margin: f32,
    /// Distance below a staircase top past which the stairs are released.
    pub stairs_top_margin: f32,
    /// Vertical speed needed to splash when crossing a fluid surface.
    pub splash_speed: f32,
    /// Scale from splash impulse to impact strength.
    pub splash_impact_scale: f32,
    /// Divisor of the gap flow force.
    flow_force_divisor: f32,
    /// Flow forces shorter than this are not applied.
    pub min_flow_force: f32,
    /// Width of one wave column of a hull surface.
    wave_width: f32,
    /// Cap on the wave velocity injected by a splash.
    pub max_wave_velocity: f32,
    /// Network reconciliation tunables.
    pub net: NetConfig,
}

impl Default for RagdollConfig {
    fn default() -> Self {
        Self {
            authoritative: false,
            authoritative_impact_scale: 0.5,
            hit_sound_floor: 1.0,
            hit_sound_cooldown: 0.2,
            max_target_movement: 3.0,
            stairs_climb_intent: 0.5,
            stairs_bottom_margin: 0.5,
            stairs_top_margin: 1.28,
            splash_speed: 3.0,
            splash_impact_scale: 0.5,
            flow_force_divisor: 500.0,
            min_flow_force: 0.01,
            wave_width: 0.16,
            max_wave_velocity: 5.0,
            net: NetConfig::default(),
        }
    }
}

impl RagdollConfig {
    /// Build from defaults overridden by `RAGDOLL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = env_bool("RAGDOLL_AUTHORITATIVE")? {
            config.authoritative = v;
        }
        if let Some(v) = env_f32("RAGDOLL_IMPACT_SCALE")? {
            config.set_authoritative_impact_scale(v);
        }
        if let Some(v) = env_f32("RAGDOLL_HIT_SOUND_COOLDOWN")? {
            config.set_hit_sound_cooldown(v);
        }
        if let Some(v) = env_f32("RAGDOLL_ALLOWED_DISTANCE")? {
            config.net.set_allowed_distance(v);
        }
        if let Some(v) = env_f32("RAGDOLL_RESET_DISTANCE")? {
            config.net.set_reset_distance(v);
        }

        config.validate()?;
        Ok(config)
    }

    /// Impact multiplier used in authoritative mode.
    pub fn authoritative_impact_scale(&self) -> f32 {
        self.authoritative_impact_scale
    }

    /// Set the authoritative impact multiplier (clamped to [0, 1]).
    pub fn set_authoritative_impact_scale(&mut self, value: f32) {
        self.authoritative_impact_scale = IMPACT_SCALE.clamp(value);
    }

    /// Seconds between hit sounds of one limb.
    pub fn hit_sound_cooldown(&self) -> f32 {
        self.hit_sound_cooldown
    }

    /// Set the hit sound cooldown (clamped).
    pub fn set_hit_sound_cooldown(&mut self, value: f32) {
        self.hit_sound_cooldown = HIT_SOUND_COOLDOWN.clamp(value);
    }

    /// Clamp applied to movement target components.
    pub fn max_target_movement(&self) -> f32 {
        self.max_target_movement
    }

    /// Set the movement target clamp.
    pub fn set_max_target_movement(&mut self, value: f32) {
        self.max_target_movement = MAX_TARGET_MOVEMENT.clamp(value);
    }

    /// Flow force divisor.
    pub fn flow_force_divisor(&self) -> f32 {
        self.flow_force_divisor
    }

    /// Set the flow force divisor (clamped, never zero).
    pub fn set_flow_force_divisor(&mut self, value: f32) {
        self.flow_force_divisor = FLOW_FORCE_DIVISOR.clamp(value);
    }

    /// Width of one hull wave column.
    pub fn wave_width(&self) -> f32 {
        self.wave_width
    }

    /// Set the wave column width (clamped, never zero).
    pub fn set_wave_width(&mut self, value: f32) {
        self.wave_width = WAVE_WIDTH.clamp(value);
    }

    /// Impact multiplier for the current mode.
    pub fn impact_scale(&self) -> f32 {
        if self.authoritative {
            self.authoritative_impact_scale
        } else {
            1.0
        }
    }

    /// Check all fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        IMPACT_SCALE.check(self.authoritative_impact_scale)?;
        HIT_SOUND_COOLDOWN.check(self.hit_sound_cooldown)?;
        MAX_TARGET_MOVEMENT.check(self.max_target_movement)?;
        FLOW_FORCE_DIVISOR.check(self.flow_force_divisor)?;
        WAVE_WIDTH.check(self.wave_width)?;
        self.net.validate()
    }
}

fn env_f32(var: &str) -> Result<Option<f32>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<f32>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var: var.to_string(), value: raw }),
        Err(_) => Ok(None),
    }
}

fn env_bool(var: &str) -> Result<Option<bool>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => match raw.trim() {
            "1" | "true" => Ok(Some(true)),
            "0" | "false" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnv { var: var.to_string(), value: raw }),
        },
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RagdollConfig::default().validate().is_ok());
        assert!(NetConfig::default().validate().is_ok());
    }

    #[test]
    fn test_setters_clamp() {
        let mut config = RagdollConfig::default();
        config.set_authoritative_impact_scale(4.0);
        assert_eq!(config.authoritative_impact_scale(), 1.0);

        config.set_wave_width(0.0);
        assert_eq!(config.wave_width(), 0.01);

        config.net.set_correction_blend(-1.0);
        assert_eq!(config.net.correction_blend(), 0.0);

        config.net.set_allowed_distance(f32::NAN);
        assert_eq!(config.net.allowed_distance(), 0.0);
    }

    #[test]
    fn test_impact_scale_only_when_authoritative() {
        let mut config = RagdollConfig::default();
        assert_eq!(config.impact_scale(), 1.0);
        config.authoritative = true;
        assert_eq!(config.impact_scale(), 0.5);
    }

    #[test]
    fn test_allowed_doubles_in_fluid() {
        let net = NetConfig::default();
        assert_eq!(net.allowed_for(false), 0.1);
        assert_eq!(net.allowed_for(true), 0.2);
    }

    #[test]
    fn test_inconsistent_distances_rejected() {
        let mut net = NetConfig::default();
        net.set_allowed_distance(5.0);
        net.set_reset_distance(1.0);
        assert!(matches!(net.validate(), Err(ConfigError::Inconsistent(_))));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RagdollConfig =
            serde_json::from_str(r#"{ "authoritative": true, "net": { "reset_distance": 4.0 } }"#)
                .unwrap();
        assert!(config.authoritative);
        assert_eq!(config.net.reset_distance(), 4.0);
        assert_eq!(config.net.allowed_distance(), 0.1);
    }
}
