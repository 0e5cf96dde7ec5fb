//! Emitter definition value structs
//!
//! Definitions are fully-populated value structs handed in by an external
//! configuration loader (RON/serde on this side; the file format and parsing
//! live outside the core). Construction-time validation is the only place
//! this subsystem reports hard errors; everything at runtime degrades
//! gracefully instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::foundation::math::Vec3;
use crate::foundation::random::EmissionVolume;
use crate::particle::curve::KeyframeCurve;

/// Fallback emission interval when a definition configures a non-positive
/// emission rate: at most one spawn event per second.
pub const EMIT_RATE_FALLBACK_MS: f32 = 1000.0;

/// Minimum particle lifetime; a zero-lifetime particle system is meaningless.
pub const MIN_MAX_AGE_MS: f32 = 1.0;

/// Definition problems that reject an emitter at construction time
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The live-particle ring must hold at least one particle
    #[error("emitter '{name}' has a zero-capacity particle ring")]
    ZeroCapacity {
        /// Name of the offending definition
        name: String,
    },
}

/// The six keyframed property curves every particle buffer owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleCurves {
    /// RGB color over particle age
    pub color: KeyframeCurve<Vec3>,
    /// Opacity over particle age
    pub opacity: KeyframeCurve<f32>,
    /// Billboard size over particle age
    pub size: KeyframeCurve<f32>,
    /// Rotation angle in radians over particle age
    pub rotation: KeyframeCurve<f32>,
    /// Texture frame index over particle age
    pub frame: KeyframeCurve<f32>,
    /// Motion-blur tail length over particle age
    pub blur_time: KeyframeCurve<f32>,
}

impl Default for ParticleCurves {
    fn default() -> Self {
        Self {
            color: KeyframeCurve::constant(Vec3::new(1.0, 1.0, 1.0)),
            opacity: KeyframeCurve::constant(1.0),
            size: KeyframeCurve::constant(1.0),
            rotation: KeyframeCurve::constant(0.0),
            frame: KeyframeCurve::constant(0.0),
            blur_time: KeyframeCurve::constant(0.0),
        }
    }
}

/// Everything needed to construct one particle emitter instance
///
/// Velocities are expressed in world units per millisecond, matching the
/// frame clock the whole core runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterDefinition {
    /// Definition name, used only for logging and diagnostics
    pub name: String,
    /// Opaque texture reference resolved by the render backend
    pub texture: String,
    /// Group id stamped on every particle this emitter spawns
    pub group_id: u8,
    /// Live-particle ring capacity
    pub capacity: u32,
    /// Spawn events per second
    pub emission_rate: f32,
    /// Particles created per spawn event
    pub burst_size: u32,
    /// Total lifetime particle budget; 0 means uncapped
    pub max_particles: u32,
    /// Particle lifetime in milliseconds
    pub max_age_ms: f32,
    /// Constant acceleration applied to live particles
    pub acceleration: Vec3,
    /// Velocity added to every particle, in emitter-local space
    pub base_velocity: Vec3,
    /// Speed away from the emission-volume center
    pub outward_velocity: f32,
    /// Fraction of the emitter's own frame-to-frame velocity imparted to
    /// new particles
    pub velocity_inherit_factor: f32,
    /// Volume positions are sampled from
    pub position_volume: EmissionVolume,
    /// Volume random velocity contributions are sampled from
    pub velocity_volume: EmissionVolume,
    /// Property curves for the buffer
    pub curves: ParticleCurves,
}

impl Default for EmitterDefinition {
    fn default() -> Self {
        Self {
            name: String::from("unnamed"),
            texture: String::new(),
            group_id: 0,
            capacity: 256,
            emission_rate: 10.0,
            burst_size: 1,
            max_particles: 0,
            max_age_ms: 1000.0,
            acceleration: Vec3::zeros(),
            base_velocity: Vec3::zeros(),
            outward_velocity: 0.0,
            velocity_inherit_factor: 0.0,
            position_volume: EmissionVolume::Point,
            velocity_volume: EmissionVolume::Point,
            curves: ParticleCurves::default(),
        }
    }
}

impl EmitterDefinition {
    /// Validate the parts of a definition that cannot be sanitized away
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.capacity == 0 {
            return Err(DefinitionError::ZeroCapacity {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Milliseconds between single spawn events
    ///
    /// A non-positive configured rate falls back to one event per second
    /// rather than dividing by zero.
    pub fn emit_rate_ms(&self) -> u32 {
        let ms = if self.emission_rate > 0.0 {
            1000.0 / self.emission_rate
        } else {
            log::warn!(
                "emitter '{}' configured with non-positive emission rate {}, \
                 falling back to one emission per second",
                self.name,
                self.emission_rate
            );
            EMIT_RATE_FALLBACK_MS
        };
        // Sub-millisecond rates saturate at one event per clock tick.
        (ms as u32).max(1)
    }

    /// Particle lifetime with the zero-lifetime clamp applied
    pub fn sanitized_max_age_ms(&self) -> f32 {
        if self.max_age_ms < MIN_MAX_AGE_MS {
            log::warn!(
                "emitter '{}' configured with max age {} ms, clamping to {}",
                self.name,
                self.max_age_ms,
                MIN_MAX_AGE_MS
            );
            MIN_MAX_AGE_MS
        } else {
            self.max_age_ms
        }
    }

    /// Particles created per spawn event, never zero
    pub fn sanitized_burst_size(&self) -> u32 {
        self.burst_size.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_is_rejected() {
        let def = EmitterDefinition {
            capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::ZeroCapacity { .. })
        ));
    }

    #[test]
    fn test_emit_rate_conversion() {
        let def = EmitterDefinition {
            emission_rate: 10.0,
            ..Default::default()
        };
        assert_eq!(def.emit_rate_ms(), 100);
    }

    #[test]
    fn test_non_positive_rate_falls_back_to_once_per_second() {
        let def = EmitterDefinition {
            emission_rate: 0.0,
            ..Default::default()
        };
        assert_eq!(def.emit_rate_ms(), 1000);

        let def = EmitterDefinition {
            emission_rate: -4.0,
            ..Default::default()
        };
        assert_eq!(def.emit_rate_ms(), 1000);
    }

    #[test]
    fn test_zero_lifetime_is_clamped() {
        let def = EmitterDefinition {
            max_age_ms: 0.0,
            ..Default::default()
        };
        assert_eq!(def.sanitized_max_age_ms(), MIN_MAX_AGE_MS);
    }

    #[test]
    fn test_definition_round_trips_through_ron() {
        let def = EmitterDefinition::default();
        let text = ron::to_string(&def).expect("serialize");
        let back: EmitterDefinition = ron::from_str(&text).expect("deserialize");
        assert_eq!(back, def);
    }
}
