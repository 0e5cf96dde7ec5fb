//! Model condition states
//!
//! One [`ModelConditionState`] names a geometry/animation state plus the
//! condition sets that select it. All states for one drawable template are
//! parsed once at load time and shared read-only afterwards; the only
//! mutation is the explicit [`ModelConditionState::bind`] pass that resolves
//! bone names to backend indices before first use, so the per-frame read
//! path never writes.

use std::collections::HashMap;

use log::warn;

use crate::condition::flags::ModelConditionFlags;
use crate::render::backend::{BoneIndex, RenderBackend};

/// Number of weapon slots a state can bind bones for
pub const WEAPON_SLOTS: usize = 3;

/// Bone bindings for one weapon slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponSlotBones {
    /// Bone the projectile launches from
    pub fire_bone: String,
    /// Bone that recoils when the weapon fires
    pub recoil_bone: Option<String>,
    /// Bone the muzzle-flash effect attaches to
    pub muzzle_flash_bone: Option<String>,
}

/// Bone bindings for one turret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurretBones {
    /// Bone rotated for turret yaw
    pub yaw_bone: String,
    /// Bone rotated for barrel pitch, if articulated
    pub pitch_bone: Option<String>,
}

/// One named animation attached to a state
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSpec {
    /// Animation clip name
    pub name: String,
    /// Clip length in milliseconds
    pub duration_ms: u32,
    /// Playback rate in frames per second
    pub fps: f32,
    /// World distance one loop covers, for locomotion sync; 0 if unused
    pub distance_covered: f32,
    /// True for idle fidgets the engine may pick at random
    pub idle: bool,
}

/// One geometry/animation state plus the condition sets selecting it
#[derive(Debug, Clone)]
pub struct ModelConditionState {
    /// State name, for diagnostics and transition authoring
    pub name: String,
    /// Render model this state displays
    pub model_name: String,
    /// Condition sets that all map to this state (many-to-one)
    pub condition_sets: Vec<ModelConditionFlags>,
    /// Sub-objects hidden while this state is active
    pub hidden_sub_objects: Vec<String>,
    /// Sub-objects force-shown while this state is active
    pub shown_sub_objects: Vec<String>,
    /// Per-weapon-slot bone bindings
    pub weapon_bones: [Option<WeaponSlotBones>; WEAPON_SLOTS],
    /// Turret bone bindings
    pub turrets: Vec<TurretBones>,
    /// Animations attached to this state
    pub animations: Vec<AnimationSpec>,

    /// Bone name -> backend index, filled once by [`Self::bind`]
    bone_indices: Option<HashMap<String, BoneIndex>>,
}

impl ModelConditionState {
    /// Create a state with a single condition set and no extras
    pub fn new(
        name: impl Into<String>,
        model_name: impl Into<String>,
        condition_set: ModelConditionFlags,
    ) -> Self {
        Self {
            name: name.into(),
            model_name: model_name.into(),
            condition_sets: vec![condition_set],
            hidden_sub_objects: Vec::new(),
            shown_sub_objects: Vec::new(),
            weapon_bones: [None, None, None],
            turrets: Vec::new(),
            animations: Vec::new(),
            bone_indices: None,
        }
    }

    /// Add another condition set mapping to this same state
    pub fn with_condition_set(mut self, set: ModelConditionFlags) -> Self {
        self.condition_sets.push(set);
        self
    }

    /// Attach an animation
    pub fn with_animation(mut self, animation: AnimationSpec) -> Self {
        self.animations.push(animation);
        self
    }

    /// True once [`Self::bind`] has resolved bone indices
    pub fn is_bound(&self) -> bool {
        self.bone_indices.is_some()
    }

    /// Resolve every named bone against the render backend
    ///
    /// Must run during the single-threaded load phase, before the state is
    /// shared for reading. Unresolvable bones are logged and simply absent
    /// from the cache; draw-time lookups then skip them.
    pub fn bind(&mut self, backend: &dyn RenderBackend) {
        let mut indices = HashMap::new();
        for bone in self.named_bones() {
            match backend.resolve_bone(&self.model_name, &bone) {
                Some(index) => {
                    indices.insert(bone, index);
                }
                None => {
                    warn!(
                        "state '{}': bone '{}' not found in model '{}'",
                        self.name, bone, self.model_name
                    );
                }
            }
        }
        self.bone_indices = Some(indices);
    }

    /// Cached backend index for a bone name
    ///
    /// `None` for bones that failed to resolve or when the state was never
    /// bound; both are content/setup problems the caller skips over.
    pub fn bone_index(&self, bone: &str) -> Option<BoneIndex> {
        match &self.bone_indices {
            Some(indices) => indices.get(bone).copied(),
            None => {
                warn!("state '{}' queried for bone '{}' before bind", self.name, bone);
                None
            }
        }
    }

    /// How long this state plays when used as a transition clip
    ///
    /// The longest attached animation wins; a state with no animations is a
    /// zero-length transition, i.e. a straight cut.
    pub fn transition_duration_ms(&self) -> u32 {
        self.animations
            .iter()
            .map(|a| a.duration_ms)
            .max()
            .unwrap_or(0)
    }

    fn named_bones(&self) -> Vec<String> {
        let mut bones = Vec::new();
        for slot in self.weapon_bones.iter().flatten() {
            bones.push(slot.fire_bone.clone());
            bones.extend(slot.recoil_bone.clone());
            bones.extend(slot.muzzle_flash_bone.clone());
        }
        for turret in &self.turrets {
            bones.push(turret.yaw_bone.clone());
            bones.extend(turret.pitch_bone.clone());
        }
        bones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::RecordingBackend;

    fn armed_state() -> ModelConditionState {
        let mut state = ModelConditionState::new("idle", "tank", ModelConditionFlags::empty());
        state.weapon_bones[0] = Some(WeaponSlotBones {
            fire_bone: String::from("muzzle01"),
            recoil_bone: Some(String::from("barrel01")),
            muzzle_flash_bone: None,
        });
        state.turrets.push(TurretBones {
            yaw_bone: String::from("turret01"),
            pitch_bone: None,
        });
        state
    }

    #[test]
    fn test_bind_resolves_known_bones_and_skips_missing() {
        let mut backend = RecordingBackend::new();
        backend.define_bone("tank", "muzzle01", 4);
        backend.define_bone("tank", "turret01", 7);

        let mut state = armed_state();
        assert!(!state.is_bound());
        state.bind(&backend);
        assert!(state.is_bound());

        assert_eq!(state.bone_index("muzzle01"), Some(BoneIndex(4)));
        assert_eq!(state.bone_index("turret01"), Some(BoneIndex(7)));
        // barrel01 was never defined on the backend: logged and absent.
        assert_eq!(state.bone_index("barrel01"), None);
    }

    #[test]
    fn test_unbound_state_returns_no_bones() {
        let state = armed_state();
        assert_eq!(state.bone_index("muzzle01"), None);
    }

    #[test]
    fn test_transition_duration_is_longest_animation() {
        let state = ModelConditionState::new("t", "tank", ModelConditionFlags::empty())
            .with_animation(AnimationSpec {
                name: String::from("stand_to_walk"),
                duration_ms: 400,
                fps: 30.0,
                distance_covered: 0.0,
                idle: false,
            })
            .with_animation(AnimationSpec {
                name: String::from("stand_to_walk_long"),
                duration_ms: 650,
                fps: 30.0,
                distance_covered: 0.0,
                idle: false,
            });

        assert_eq!(state.transition_duration_ms(), 650);

        let bare = ModelConditionState::new("cut", "tank", ModelConditionFlags::empty());
        assert_eq!(bare.transition_duration_ms(), 0);
    }
}
