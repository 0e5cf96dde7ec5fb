//! Backend abstraction for the draw and particle subsystems
//!
//! This module defines the narrow interface the core consumes from an
//! actual renderer: opaque resource handles, scene registration, bone
//! lookup, and transformed draw submission. The core passes handles through
//! without interpreting them; everything GPU-shaped lives behind this trait.

use thiserror::Error;

use crate::foundation::math::{Mat4, Vec2, Vec3};
use crate::particle::buffer::ParticleVertex;

/// Result type for backend operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors a render backend may report on submission
///
/// The dispatch layer logs these and drops the draw for the frame; they
/// never propagate as panics into the simulation.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The backend rejected a draw call
    #[error("draw submission failed: {0}")]
    Submission(String),
    /// A referenced resource is not loaded on the backend
    #[error("unknown resource '{0}'")]
    UnknownResource(String),
}

/// Handle to a texture resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to a shader resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Index of a named bone within a backend-side model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoneIndex(pub u32);

/// Handle to a render object registered with the backend's scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderObjectHandle(pub u64);

/// One transformed model draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Backend model name
    pub model: String,
    /// World transform
    pub transform: Mat4,
    /// Tint color applied over the model's materials
    pub tint: Option<Vec3>,
    /// Overall opacity (stealth looks fade this down)
    pub opacity: f32,
    /// UV scroll offset, e.g. for tread animation
    pub uv_scroll: Vec2,
    /// Sub-objects hidden for this draw
    pub hidden_sub_objects: Vec<String>,
    /// Sub-objects force-shown for this draw
    pub shown_sub_objects: Vec<String>,
}

/// One particle-buffer draw: a texture plus packed per-particle state
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleDrawCall {
    /// Texture reference from the emitter definition
    pub texture: String,
    /// Per-particle render state in spawn order
    pub vertices: Vec<ParticleVertex>,
}

/// The renderer this core draws through
///
/// Implementations are expected to be cheap to call per frame; the core
/// performs no batching of its own beyond per-buffer particle packing.
pub trait RenderBackend {
    /// Resolve a texture reference to a backend handle
    fn resolve_texture(&mut self, name: &str) -> Option<TextureHandle>;

    /// Resolve a named bone within a model
    fn resolve_bone(&self, model: &str, bone: &str) -> Option<BoneIndex>;

    /// Create a render-object handle for scene registration
    fn register_render_object(&mut self) -> RenderObjectHandle;

    /// Add a registered render object to the scene
    fn add_to_scene(&mut self, handle: RenderObjectHandle);

    /// Remove a registered render object from the scene
    fn remove_from_scene(&mut self, handle: RenderObjectHandle);

    /// Submit one transformed model draw
    fn submit_model(&mut self, call: DrawCall) -> RenderResult<()>;

    /// Submit one particle-buffer draw
    fn submit_particles(&mut self, call: ParticleDrawCall) -> RenderResult<()>;
}
