//! Drawables and draw dispatch
//!
//! A `Drawable` is the renderable facade for one simulation object: a
//! transform, a condition bitset, a visual style, and an ordered list of
//! draw modules. Drawables live in a [`DrawableTable`] and refer to each
//! other only through generational [`DrawableId`] handles; the
//! container/rider relationship is a handle edge, never an owning pointer
//! cycle.

use log::warn;
use slotmap::{new_key_type, SlotMap};

use crate::condition::flags::ModelConditionFlags;
use crate::draw::module::DrawModule;
use crate::foundation::math::{Transform, Vec3};
use crate::render::backend::RenderBackend;

new_key_type! {
    /// Stable handle to a drawable in a [`DrawableTable`]
    pub struct DrawableId;
}

/// Tint and stealth-look state applied to a drawable's draws
///
/// A container passes its effective style down to dependents it draws, so a
/// tinted or stealthed transport renders its rider the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualStyle {
    /// Tint color over the model's materials
    pub tint: Option<Vec3>,
    /// Overall opacity; stealth looks fade this toward zero
    pub opacity: f32,
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self {
            tint: None,
            opacity: 1.0,
        }
    }
}

impl VisualStyle {
    /// Combine this style with the effective style of a container
    ///
    /// The container's tint wins when present; opacities multiply.
    pub fn inherit(&self, container: &Self) -> Self {
        Self {
            tint: container.tint.or(self.tint),
            opacity: self.opacity * container.opacity,
        }
    }
}

/// A request, produced by a draw module, to draw a dependent drawable
#[derive(Debug, Clone)]
pub struct DependentRequest {
    /// Handle of the dependent drawable
    pub id: DrawableId,
    /// Effective style the dependent inherits
    pub style: VisualStyle,
}

/// Services threaded through every draw call
///
/// Explicitly passed rather than global so tests can run many isolated
/// pipelines side by side.
pub struct DrawContext<'a> {
    /// The render backend draws are submitted to
    pub backend: &'a mut dyn RenderBackend,
    /// Current frame time in milliseconds
    pub now_ms: u32,
}

/// Renderable facade paired 1:1 with a simulation object
pub struct Drawable {
    /// World transform
    pub transform: Transform,
    /// Own visual style before container inheritance
    pub style: VisualStyle,
    /// Hidden drawables are skipped by the normal pass; a dependency draw
    /// still renders them (that is how riders appear)
    pub hidden: bool,
    condition_flags: ModelConditionFlags,
    modules: Vec<DrawModule>,
}

impl Default for Drawable {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawable {
    /// Create an empty drawable at the identity transform
    pub fn new() -> Self {
        Self {
            transform: Transform::identity(),
            style: VisualStyle::default(),
            hidden: false,
            condition_flags: ModelConditionFlags::empty(),
            modules: Vec::new(),
        }
    }

    /// Append a draw module; module order is draw order within the object
    pub fn add_module(&mut self, module: DrawModule) {
        self.modules.push(module);
    }

    /// Builder-style module append
    pub fn with_module(mut self, module: DrawModule) -> Self {
        self.modules.push(module);
        self
    }

    /// The current condition bitset
    pub fn condition_flags(&self) -> ModelConditionFlags {
        self.condition_flags
    }

    /// Replace the condition bitset the next draw resolves against
    pub fn set_condition_flags(&mut self, flags: ModelConditionFlags) {
        self.condition_flags = flags;
    }

    /// The drawable's modules
    pub fn modules(&self) -> &[DrawModule] {
        &self.modules
    }

    /// Mutable access to the drawable's modules
    pub fn modules_mut(&mut self) -> &mut [DrawModule] {
        &mut self.modules
    }

    /// Fire the dependency-cleared edge on every dependency module
    ///
    /// One-shot: each module draws its dependent once and re-arms to
    /// pending. Hosts re-signal after load and on containment changes.
    pub fn notify_dependency_cleared(&mut self) {
        for module in &mut self.modules {
            if let DrawModule::Dependency(d) = module {
                d.notify_dependency_cleared();
            }
        }
    }

    /// Draw this object's modules in order, collecting dependent requests
    pub(crate) fn draw(
        &mut self,
        ctx: &mut DrawContext<'_>,
        inherited: Option<&VisualStyle>,
    ) -> Vec<DependentRequest> {
        let style = match inherited {
            Some(container) => self.style.inherit(container),
            None => self.style.clone(),
        };

        let mut requests = Vec::new();
        for module in &mut self.modules {
            if let Some(request) =
                module.do_draw(&self.transform, self.condition_flags, &style, ctx)
            {
                requests.push(request);
            }
        }
        requests
    }
}

/// Shared table of drawables addressed by generational handles
#[derive(Default)]
pub struct DrawableTable {
    drawables: SlotMap<DrawableId, Drawable>,
}

impl DrawableTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a drawable and return its handle
    pub fn insert(&mut self, drawable: Drawable) -> DrawableId {
        self.drawables.insert(drawable)
    }

    /// Remove a drawable; stale handles held elsewhere simply stop resolving
    pub fn remove(&mut self, id: DrawableId) -> Option<Drawable> {
        self.drawables.remove(id)
    }

    /// Shared access by handle
    pub fn get(&self, id: DrawableId) -> Option<&Drawable> {
        self.drawables.get(id)
    }

    /// Mutable access by handle
    pub fn get_mut(&mut self, id: DrawableId) -> Option<&mut Drawable> {
        self.drawables.get_mut(id)
    }

    /// True when the handle still resolves
    pub fn contains(&self, id: DrawableId) -> bool {
        self.drawables.contains_key(id)
    }

    /// Number of drawables in the table
    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    /// True when the table is empty
    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }
}

/// Draw every visible drawable, honoring dependency composition
///
/// Hidden drawables are skipped by this pass; they render only when a
/// container's dependency module requests them, which guarantees the
/// container's draw calls precede the dependent's.
pub fn draw_all(table: &mut DrawableTable, ctx: &mut DrawContext<'_>) {
    let ids: Vec<DrawableId> = table.drawables.keys().collect();
    for id in ids {
        draw_one(table, id, ctx, None, false);
    }
}

fn draw_one(
    table: &mut DrawableTable,
    id: DrawableId,
    ctx: &mut DrawContext<'_>,
    inherited: Option<&VisualStyle>,
    forced: bool,
) {
    let requests = match table.get_mut(id) {
        Some(drawable) if forced || !drawable.hidden => drawable.draw(ctx, inherited),
        Some(_) => return,
        None => {
            warn!("draw requested for missing drawable {id:?}; skipping");
            return;
        }
    };

    for request in requests {
        if table.contains(request.id) {
            draw_one(table, request.id, ctx, Some(&request.style), true);
        } else {
            warn!(
                "dependent drawable {:?} has no entry; skipping for this frame",
                request.id
            );
        }
    }
}
