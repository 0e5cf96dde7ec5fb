//! Draw-behavior modules
//!
//! Rather than a deep override chain of renderer subclasses, a drawable
//! composes a small set of orthogonal behaviors: base model drawing driven
//! by condition-state resolution, tread UV animation, and rider/dependency
//! composition. Each behavior is testable in isolation and the closed enum
//! keeps dispatch flat.

use std::sync::Arc;

use log::warn;

use crate::condition::flags::ModelConditionFlags;
use crate::condition::resolver::{ModelConditionResolver, StateIndex, TransitionIndex};
use crate::draw::drawable::{DependentRequest, DrawContext, DrawableId, VisualStyle};
use crate::foundation::math::{Transform, Vec2};
use crate::render::backend::DrawCall;

/// A per-object rendering behavior
///
/// One drawable owns an ordered list of these; module order is draw order
/// within the object, so a rider-composition module placed after the model
/// module yields container-then-dependent submission.
pub enum DrawModule {
    /// Condition-resolved model rendering
    Model(ModelDraw),
    /// Scrolling tread animation
    Treads(TreadDraw),
    /// Rider/dependency composition
    Dependency(DependencyDraw),
}

impl DrawModule {
    /// Execute the behavior for one frame
    ///
    /// Returns a request to draw a dependent drawable, if this behavior
    /// composes one and its dependency has been cleared.
    pub(crate) fn do_draw(
        &mut self,
        transform: &Transform,
        flags: ModelConditionFlags,
        style: &VisualStyle,
        ctx: &mut DrawContext<'_>,
    ) -> Option<DependentRequest> {
        match self {
            Self::Model(m) => {
                m.do_draw(transform, flags, style, ctx);
                None
            }
            Self::Treads(t) => {
                t.do_draw(transform, flags, style, ctx);
                None
            }
            Self::Dependency(d) => d.do_draw(style),
        }
    }
}

/// Plays the best-fit condition state for the owning drawable
///
/// Re-resolves only when the condition bitset changes, and blends state
/// changes through an authored transition state when one exists.
pub struct ModelDraw {
    resolver: Arc<ModelConditionResolver>,
    current: Option<StateIndex>,
    last_flags: Option<ModelConditionFlags>,
    transition: Option<ActiveTransition>,
}

struct ActiveTransition {
    index: TransitionIndex,
    until_ms: u32,
}

impl ModelDraw {
    /// Create a model-draw behavior over a shared state table
    pub fn new(resolver: Arc<ModelConditionResolver>) -> Self {
        Self {
            resolver,
            current: None,
            last_flags: None,
            transition: None,
        }
    }

    /// The currently resolved state, if any matched
    pub fn current_state(&self) -> Option<StateIndex> {
        self.current
    }

    /// True while a transition clip is playing
    pub fn in_transition(&self) -> bool {
        self.transition.is_some()
    }

    fn do_draw(
        &mut self,
        transform: &Transform,
        flags: ModelConditionFlags,
        style: &VisualStyle,
        ctx: &mut DrawContext<'_>,
    ) {
        if self.last_flags != Some(flags) {
            self.last_flags = Some(flags);
            self.resolve(flags, ctx.now_ms);
        }

        if let Some(t) = &self.transition {
            if ctx.now_ms >= t.until_ms {
                self.transition = None;
            }
        }

        let state = match &self.transition {
            Some(t) => self.resolver.transition_state(t.index),
            None => match self.current {
                Some(index) => self.resolver.state(index),
                // Unmatched bitset: the object stays hidden this frame.
                None => return,
            },
        };

        let call = DrawCall {
            model: state.model_name.clone(),
            transform: transform.to_matrix(),
            tint: style.tint,
            opacity: style.opacity,
            uv_scroll: Vec2::zeros(),
            hidden_sub_objects: state.hidden_sub_objects.clone(),
            shown_sub_objects: state.shown_sub_objects.clone(),
        };
        if let Err(e) = ctx.backend.submit_model(call) {
            warn!("model draw failed: {e}");
        }
    }

    fn resolve(&mut self, flags: ModelConditionFlags, now_ms: u32) {
        let new = self.resolver.find_best_state(flags).map(|(index, _)| index);

        if let (Some(prev), Some(next)) = (self.current, new) {
            if prev != next {
                self.transition = self.resolver.find_transition(prev, next).map(
                    |(index, state)| ActiveTransition {
                        index,
                        until_ms: now_ms + state.transition_duration_ms(),
                    },
                );
            }
        } else {
            self.transition = None;
        }

        self.current = new;
    }
}

/// Scrolls tread UVs while the owning drawable is moving
pub struct TreadDraw {
    tread_model: String,
    scroll_per_ms: f32,
    offset: f32,
    last_ms: Option<u32>,
}

impl TreadDraw {
    /// Create a tread behavior for the given tread mesh
    pub fn new(tread_model: impl Into<String>, scroll_per_ms: f32) -> Self {
        Self {
            tread_model: tread_model.into(),
            scroll_per_ms,
            offset: 0.0,
            last_ms: None,
        }
    }

    /// Current UV scroll offset, wrapped to [0, 1)
    pub fn offset(&self) -> f32 {
        self.offset
    }

    fn do_draw(
        &mut self,
        transform: &Transform,
        flags: ModelConditionFlags,
        style: &VisualStyle,
        ctx: &mut DrawContext<'_>,
    ) {
        let elapsed_ms = self
            .last_ms
            .map_or(0, |last| ctx.now_ms.saturating_sub(last));
        self.last_ms = Some(ctx.now_ms);

        if flags.contains(ModelConditionFlags::MOVING) && elapsed_ms > 0 {
            self.offset = (self.offset + self.scroll_per_ms * elapsed_ms as f32).fract();
        }

        let call = DrawCall {
            model: self.tread_model.clone(),
            transform: transform.to_matrix(),
            tint: style.tint,
            opacity: style.opacity,
            uv_scroll: Vec2::new(self.offset, 0.0),
            hidden_sub_objects: Vec::new(),
            shown_sub_objects: Vec::new(),
        };
        if let Err(e) = ctx.backend.submit_model(call) {
            warn!("tread draw failed: {e}");
        }
    }
}

/// Draws a dependent drawable after its container
///
/// The dependency-cleared signal is a one-shot edge: after the dependent is
/// drawn once, the module reverts to pending until the host re-signals
/// (load, containment change). The container's own draw calls are already
/// submitted when the request is honored, so bone queries the dependent
/// issues against the container observe this frame's pose.
pub struct DependencyDraw {
    dependent: DrawableId,
    cleared: bool,
}

impl DependencyDraw {
    /// Create a dependency behavior targeting a drawable handle
    pub fn new(dependent: DrawableId) -> Self {
        Self {
            dependent,
            cleared: false,
        }
    }

    /// The dependent drawable's handle
    pub fn dependent(&self) -> DrawableId {
        self.dependent
    }

    /// True while the edge signal is pending consumption
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Fire the one-shot dependency-cleared edge
    pub fn notify_dependency_cleared(&mut self) {
        self.cleared = true;
    }

    fn do_draw(&mut self, style: &VisualStyle) -> Option<DependentRequest> {
        if !self.cleared {
            return None;
        }
        self.cleared = false;
        Some(DependentRequest {
            id: self.dependent,
            style: style.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::state::{AnimationSpec, ModelConditionState};
    use crate::render::recording::RecordingBackend;

    fn draw(
        module: &mut ModelDraw,
        flags: ModelConditionFlags,
        backend: &mut RecordingBackend,
        now_ms: u32,
    ) {
        let mut ctx = DrawContext {
            backend,
            now_ms,
        };
        module.do_draw(
            &Transform::identity(),
            flags,
            &VisualStyle::default(),
            &mut ctx,
        );
    }

    fn stand_walk_resolver() -> (Arc<ModelConditionResolver>, StateIndex, StateIndex) {
        let mut resolver = ModelConditionResolver::new();
        let stand = resolver.register_state(ModelConditionState::new(
            "stand",
            "tank_stand",
            ModelConditionFlags::empty(),
        ));
        let walk = resolver.register_state(ModelConditionState::new(
            "walk",
            "tank_walk",
            ModelConditionFlags::MOVING,
        ));
        resolver.register_transition(
            stand,
            walk,
            ModelConditionState::new("stand_to_walk", "tank_lurch", ModelConditionFlags::empty())
                .with_animation(AnimationSpec {
                    name: String::from("lurch"),
                    duration_ms: 200,
                    fps: 30.0,
                    distance_covered: 0.0,
                    idle: false,
                }),
        );
        (Arc::new(resolver), stand, walk)
    }

    #[test]
    fn test_model_draw_reresolves_on_flag_change() {
        let (resolver, stand, walk) = stand_walk_resolver();
        let mut module = ModelDraw::new(resolver);
        let mut backend = RecordingBackend::new();

        draw(&mut module, ModelConditionFlags::empty(), &mut backend, 0);
        assert_eq!(module.current_state(), Some(stand));

        draw(&mut module, ModelConditionFlags::MOVING, &mut backend, 33);
        assert_eq!(module.current_state(), Some(walk));
    }

    #[test]
    fn test_state_change_plays_transition_until_its_duration() {
        let (resolver, _, _) = stand_walk_resolver();
        let mut module = ModelDraw::new(resolver);
        let mut backend = RecordingBackend::new();

        draw(&mut module, ModelConditionFlags::empty(), &mut backend, 0);
        draw(&mut module, ModelConditionFlags::MOVING, &mut backend, 100);
        assert!(module.in_transition());

        // Still inside the 200 ms clip.
        draw(&mut module, ModelConditionFlags::MOVING, &mut backend, 250);
        // Past 100 + 200: the transition expires and the target plays.
        draw(&mut module, ModelConditionFlags::MOVING, &mut backend, 400);
        assert!(!module.in_transition());

        assert_eq!(
            backend.drawn_models(),
            vec!["tank_stand", "tank_lurch", "tank_lurch", "tank_walk"]
        );
    }

    #[test]
    fn test_unauthored_transition_is_a_straight_cut() {
        let mut resolver = ModelConditionResolver::new();
        resolver.register_state(ModelConditionState::new(
            "stand",
            "tank_stand",
            ModelConditionFlags::empty(),
        ));
        resolver.register_state(ModelConditionState::new(
            "walk",
            "tank_walk",
            ModelConditionFlags::MOVING,
        ));
        let mut module = ModelDraw::new(Arc::new(resolver));
        let mut backend = RecordingBackend::new();

        draw(&mut module, ModelConditionFlags::empty(), &mut backend, 0);
        draw(&mut module, ModelConditionFlags::MOVING, &mut backend, 33);

        assert!(!module.in_transition());
        assert_eq!(backend.drawn_models(), vec!["tank_stand", "tank_walk"]);
    }

    #[test]
    fn test_unmatched_flags_hide_the_model_without_panicking() {
        let mut resolver = ModelConditionResolver::new();
        resolver.register_state(ModelConditionState::new(
            "walk",
            "tank_walk",
            ModelConditionFlags::MOVING,
        ));
        let mut module = ModelDraw::new(Arc::new(resolver));
        let mut backend = RecordingBackend::new();

        // No catch-all registered: DAMAGED matches nothing.
        draw(&mut module, ModelConditionFlags::DAMAGED, &mut backend, 0);
        assert_eq!(module.current_state(), None);
        assert!(backend.drawn_models().is_empty());
    }
}
