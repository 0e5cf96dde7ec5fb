//! Headless recording backend
//!
//! Implements [`RenderBackend`] without a GPU: every submission is appended
//! to an in-order log the caller can inspect. Tests assert draw ordering
//! against it, and the demo app uses it to run the full pipeline headlessly.

use std::collections::HashMap;

use crate::render::backend::{
    BoneIndex, DrawCall, ParticleDrawCall, RenderBackend, RenderObjectHandle, RenderResult,
    TextureHandle,
};

/// One recorded backend interaction
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// A model draw was submitted
    Model(DrawCall),
    /// A particle draw was submitted
    Particles {
        /// Texture the buffer renders with
        texture: String,
        /// Number of live particles submitted
        count: usize,
    },
    /// A render object was added to the scene
    SceneAdd(RenderObjectHandle),
    /// A render object was removed from the scene
    SceneRemove(RenderObjectHandle),
}

/// In-memory [`RenderBackend`] that records submissions in order
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<RecordedCall>,
    bones: HashMap<(String, String), BoneIndex>,
    textures: HashMap<String, TextureHandle>,
    next_handle: u64,
}

impl RecordingBackend {
    /// Create an empty recording backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `model` contains `bone` at the given index
    pub fn define_bone(&mut self, model: &str, bone: &str, index: u32) {
        self.bones
            .insert((model.to_owned(), bone.to_owned()), BoneIndex(index));
    }

    /// Everything submitted so far, in submission order
    pub fn recorded(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Model names of the recorded model draws, in order
    pub fn drawn_models(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Model(call) => Some(call.model.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn resolve_texture(&mut self, name: &str) -> Option<TextureHandle> {
        let next = &mut self.next_handle;
        Some(*self.textures.entry(name.to_owned()).or_insert_with(|| {
            *next += 1;
            TextureHandle(*next)
        }))
    }

    fn resolve_bone(&self, model: &str, bone: &str) -> Option<BoneIndex> {
        self.bones.get(&(model.to_owned(), bone.to_owned())).copied()
    }

    fn register_render_object(&mut self) -> RenderObjectHandle {
        self.next_handle += 1;
        RenderObjectHandle(self.next_handle)
    }

    fn add_to_scene(&mut self, handle: RenderObjectHandle) {
        self.calls.push(RecordedCall::SceneAdd(handle));
    }

    fn remove_from_scene(&mut self, handle: RenderObjectHandle) {
        self.calls.push(RecordedCall::SceneRemove(handle));
    }

    fn submit_model(&mut self, call: DrawCall) -> RenderResult<()> {
        self.calls.push(RecordedCall::Model(call));
        Ok(())
    }

    fn submit_particles(&mut self, call: ParticleDrawCall) -> RenderResult<()> {
        self.calls.push(RecordedCall::Particles {
            texture: call.texture,
            count: call.vertices.len(),
        });
        Ok(())
    }
}
