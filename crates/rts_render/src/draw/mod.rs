//! Drawable composition and per-frame draw dispatch
//!
//! Each render tick walks the drawable table in order and invokes every
//! visible drawable's modules; dependency modules chain container draws to
//! their riders in strict container-first order.

pub mod drawable;
pub mod module;

pub use drawable::{
    draw_all, DependentRequest, DrawContext, Drawable, DrawableId, DrawableTable, VisualStyle,
};
pub use module::{DependencyDraw, DrawModule, ModelDraw, TreadDraw};
