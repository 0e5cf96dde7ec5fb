//! # RTS Render Core
//!
//! Draw-dispatch and particle-simulation core for a real-time-strategy
//! renderer.
//!
//! ## Features
//!
//! - **Condition-State Resolution**: best-fit matching of a condition
//!   bitset against authored geometry/animation states, with transition
//!   blending
//! - **Draw Dispatch**: per-object draw modules with dependency-ordered
//!   composition (a transport draws before its rider)
//! - **Particle Simulation**: frame-rate-independent emitters feeding
//!   fixed-capacity ring buffers with keyframed property curves
//! - **Continuous LOD**: cost/value numbers per particle buffer for an
//!   external detail scheduler
//! - **Backend-Agnostic**: all rendering goes through an opaque-handle
//!   backend trait; a recording backend runs the whole pipeline headlessly
//!
//! ## Quick Start
//!
//! ```rust
//! use rts_render::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let def = EmitterDefinition {
//!     emission_rate: 20.0,
//!     max_age_ms: 1500.0,
//!     ..Default::default()
//! };
//! let mut emitter = ParticleEmitter::new(&def).expect("valid definition");
//! let mut rng = StdRng::seed_from_u64(1);
//!
//! emitter.start(0, &Transform::identity());
//! emitter.update(100, &Transform::identity(), &mut rng);
//! assert_eq!(emitter.buffer().live_count(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod condition;
pub mod draw;
pub mod foundation;
pub mod particle;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::condition::{
        ModelConditionFlags, ModelConditionResolver, ModelConditionState,
    };
    pub use crate::draw::{
        draw_all, DependencyDraw, DrawContext, DrawModule, Drawable, DrawableId, DrawableTable,
        ModelDraw, TreadDraw, VisualStyle,
    };
    pub use crate::foundation::{
        math::{Transform, Vec3},
        random::{EmissionVolume, RandomSource},
        time::FrameClock,
    };
    pub use crate::particle::{
        EmitterDefinition, EmitterState, Keyframe, KeyframeCurve, ParticleCurves, ParticleEmitter,
    };
    pub use crate::render::{RenderBackend, RecordingBackend, SceneMembership};
}
