//! Particle simulation subsystem
//!
//! An emitter drives a fixed-capacity buffer of live particles whose
//! animatable properties follow keyframed curves. The render backend only
//! ever sees the packed per-particle state the buffer computes; the
//! simulation side never blocks and never allocates per frame beyond the
//! render-state snapshot.

pub mod buffer;
pub mod curve;
pub mod definition;
pub mod emitter;

pub use buffer::{Particle, ParticleBuffer, ParticleVertex, MAX_SUBDIVISION};
pub use curve::{Keyframe, KeyframeCurve};
pub use definition::{DefinitionError, EmitterDefinition, ParticleCurves};
pub use emitter::{EmitterState, ParticleEmitter};
