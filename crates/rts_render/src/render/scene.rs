//! Scene membership tracking
//!
//! A particle buffer's render object is registered with exactly one scene
//! at a time. `SceneMembership` makes "add to scene" and "remove from
//! scene" idempotent: requesting the state the object is already in is a
//! no-op rather than a double-registration bug.

use crate::render::backend::{RenderBackend, RenderObjectHandle};

/// Idempotent scene add/remove wrapper around one render-object handle
#[derive(Debug, Default)]
pub struct SceneMembership {
    handle: Option<RenderObjectHandle>,
    in_scene: bool,
}

impl SceneMembership {
    /// Create a membership that is not yet in any scene
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the render object is in the scene
    pub fn is_in_scene(&self) -> bool {
        self.in_scene
    }

    /// The backend handle, once one has been registered
    pub fn handle(&self) -> Option<RenderObjectHandle> {
        self.handle
    }

    /// Ensure the render object is in the scene
    ///
    /// Registers a handle with the backend on first use.
    pub fn ensure_in_scene(&mut self, backend: &mut dyn RenderBackend) {
        if self.in_scene {
            return;
        }
        let handle = *self
            .handle
            .get_or_insert_with(|| backend.register_render_object());
        backend.add_to_scene(handle);
        self.in_scene = true;
    }

    /// Ensure the render object is out of the scene
    pub fn ensure_removed(&mut self, backend: &mut dyn RenderBackend) {
        if !self.in_scene {
            return;
        }
        if let Some(handle) = self.handle {
            backend.remove_from_scene(handle);
        }
        self.in_scene = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{RecordedCall, RecordingBackend};

    #[test]
    fn test_add_and_remove_are_idempotent() {
        let mut backend = RecordingBackend::new();
        let mut membership = SceneMembership::new();

        membership.ensure_in_scene(&mut backend);
        membership.ensure_in_scene(&mut backend);
        assert!(membership.is_in_scene());

        membership.ensure_removed(&mut backend);
        membership.ensure_removed(&mut backend);
        assert!(!membership.is_in_scene());

        // Exactly one add and one remove reached the backend.
        let adds = backend
            .recorded()
            .iter()
            .filter(|c| matches!(c, RecordedCall::SceneAdd(_)))
            .count();
        let removes = backend
            .recorded()
            .iter()
            .filter(|c| matches!(c, RecordedCall::SceneRemove(_)))
            .count();
        assert_eq!((adds, removes), (1, 1));
    }

    #[test]
    fn test_handle_is_registered_once_and_reused() {
        let mut backend = RecordingBackend::new();
        let mut membership = SceneMembership::new();

        membership.ensure_in_scene(&mut backend);
        let first = membership.handle();
        membership.ensure_removed(&mut backend);
        membership.ensure_in_scene(&mut backend);

        assert_eq!(membership.handle(), first);
    }
}
