//! Model condition subsystem
//!
//! Condition bitsets encode boolean simulation facts; the resolver maps a
//! drawable's current bitset to the best-fit geometry/animation state and
//! finds optional transition clips between states.

pub mod flags;
pub mod resolver;
pub mod state;

pub use flags::ModelConditionFlags;
pub use resolver::{ModelConditionResolver, StateIndex, TransitionIndex};
pub use state::{
    AnimationSpec, ModelConditionState, TurretBones, WeaponSlotBones, WEAPON_SLOTS,
};
