//! Render collaborator surface
//!
//! The core does not rasterize anything; it submits transformed draw calls
//! through the [`backend::RenderBackend`] trait and treats textures,
//! shaders and bones as opaque handles the real renderer owns.

pub mod backend;
pub mod recording;
pub mod scene;

pub use backend::{
    BoneIndex, DrawCall, ParticleDrawCall, RenderBackend, RenderError, RenderObjectHandle,
    RenderResult, ShaderHandle, TextureHandle,
};
pub use recording::{RecordedCall, RecordingBackend};
pub use scene::SceneMembership;
