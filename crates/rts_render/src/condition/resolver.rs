//! Best-fit condition state resolution
//!
//! Maps a condition bitset to the single best-matching
//! [`ModelConditionState`], and separately resolves optional transition
//! states between two resolved states. Content authors register states from
//! most general (empty set) to most specific; the resolver picks the most
//! specific applicable entry without authors having to enumerate every bit
//! combination.

use std::collections::HashMap;

use log::warn;

use crate::condition::flags::ModelConditionFlags;
use crate::condition::state::ModelConditionState;
use crate::render::backend::RenderBackend;

/// Registration index of a state within one resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateIndex(pub usize);

/// Index of a transition state within one resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionIndex(pub usize);

/// Immutable-after-load table of condition states and their transitions
///
/// Lookups never mutate the table, so one resolver may be shared read-only
/// by every drawable using the same template (an `Arc` in practice).
#[derive(Debug, Default)]
pub struct ModelConditionResolver {
    states: Vec<ModelConditionState>,
    transition_states: Vec<ModelConditionState>,
    /// Unordered pair signature of two state indices -> transition state
    transitions: HashMap<u64, TransitionIndex>,
    bound: bool,
}

impl ModelConditionResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a state, preserving registration order for tie-breaking
    pub fn register_state(&mut self, state: ModelConditionState) -> StateIndex {
        self.states.push(state);
        StateIndex(self.states.len() - 1)
    }

    /// Register a transition state played between two registered states
    ///
    /// The pair is unordered: the same clip covers both directions.
    pub fn register_transition(
        &mut self,
        a: StateIndex,
        b: StateIndex,
        state: ModelConditionState,
    ) {
        self.transition_states.push(state);
        let index = TransitionIndex(self.transition_states.len() - 1);
        self.transitions.insert(pair_signature(a, b), index);
    }

    /// Number of registered states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when no states are registered
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Look up a registered state by index
    pub fn state(&self, index: StateIndex) -> &ModelConditionState {
        &self.states[index.0]
    }

    /// Look up a transition state by index
    pub fn transition_state(&self, index: TransitionIndex) -> &ModelConditionState {
        &self.transition_states[index.0]
    }

    /// Find the best-matching state for a condition bitset
    ///
    /// A state matches when one of its condition sets is a subset of
    /// `flags`; among matches the entry with the largest population count
    /// wins, ties broken by earliest registration. `None` means no state
    /// matched at all, which is a content-authoring error (templates register an
    /// empty-set catch-all); the caller hides the object for the frame
    /// rather than crashing.
    pub fn find_best_state(
        &self,
        flags: ModelConditionFlags,
    ) -> Option<(StateIndex, &ModelConditionState)> {
        let mut best: Option<(usize, u32)> = None;

        for (index, state) in self.states.iter().enumerate() {
            for set in &state.condition_sets {
                if !set.is_subset_of(flags) {
                    continue;
                }
                let population = set.population();
                // Strict > keeps the earliest registration on ties.
                if best.map_or(true, |(_, best_population)| population > best_population) {
                    best = Some((index, population));
                }
            }
        }

        match best {
            Some((index, _)) => Some((StateIndex(index), &self.states[index])),
            None => {
                warn!(
                    "no condition state matches {:?}; template is missing a catch-all",
                    flags
                );
                None
            }
        }
    }

    /// Find the transition state between two resolved states, if authored
    ///
    /// Absence is not an error; the caller falls back to a straight cut.
    pub fn find_transition(
        &self,
        prev: StateIndex,
        next: StateIndex,
    ) -> Option<(TransitionIndex, &ModelConditionState)> {
        let index = *self.transitions.get(&pair_signature(prev, next))?;
        Some((index, &self.transition_states[index.0]))
    }

    /// True once [`Self::bind`] has run
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Resolve bone indices for every state against the render backend
    ///
    /// The one write the table ever sees after registration; run it during
    /// the single-threaded load phase, before sharing the resolver.
    pub fn bind(&mut self, backend: &dyn RenderBackend) {
        for state in &mut self.states {
            state.bind(backend);
        }
        for state in &mut self.transition_states {
            state.bind(backend);
        }
        self.bound = true;
    }
}

/// Order-independent signature of a state pair
fn pair_signature(a: StateIndex, b: StateIndex) -> u64 {
    let (lo, hi) = if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) };
    ((lo as u64) << 32) | (hi as u64 & 0xFFFF_FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(name: &str, set: ModelConditionFlags) -> ModelConditionState {
        ModelConditionState::new(name, name, set)
    }

    /// The canonical three-state template: default, moving, moving+damaged.
    fn abc_resolver() -> ModelConditionResolver {
        let mut resolver = ModelConditionResolver::new();
        resolver.register_state(state("a_default", ModelConditionFlags::empty()));
        resolver.register_state(state("b_moving", ModelConditionFlags::MOVING));
        resolver.register_state(state(
            "c_moving_damaged",
            ModelConditionFlags::MOVING | ModelConditionFlags::DAMAGED,
        ));
        resolver
    }

    #[test]
    fn test_most_specific_subset_wins() {
        let resolver = abc_resolver();
        let flags = ModelConditionFlags::MOVING
            | ModelConditionFlags::DAMAGED
            | ModelConditionFlags::NIGHT;

        let (_, best) = resolver.find_best_state(flags).expect("catch-all exists");
        assert_eq!(best.name, "c_moving_damaged");
    }

    #[test]
    fn test_unmatched_bits_fall_through_to_catch_all() {
        let resolver = abc_resolver();

        let (_, best) = resolver
            .find_best_state(ModelConditionFlags::DAMAGED)
            .expect("catch-all exists");
        // DAMAGED alone matches no non-empty entry; only the empty set fits.
        assert_eq!(best.name, "a_default");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = abc_resolver();
        let flags = ModelConditionFlags::MOVING | ModelConditionFlags::DAMAGED;

        let first = resolver.find_best_state(flags).map(|(i, _)| i);
        let second = resolver.find_best_state(flags).map(|(i, _)| i);
        assert_eq!(first, second);
    }

    #[test]
    fn test_superset_flags_never_resolve_less_specific() {
        let resolver = abc_resolver();

        let (narrow, _) = resolver
            .find_best_state(ModelConditionFlags::MOVING)
            .unwrap();
        let (wide, _) = resolver
            .find_best_state(ModelConditionFlags::MOVING | ModelConditionFlags::DAMAGED)
            .unwrap();

        let narrow_population = resolver.state(narrow).condition_sets[0].population();
        let wide_population = resolver.state(wide).condition_sets[0].population();
        assert!(wide_population >= narrow_population);
    }

    #[test]
    fn test_ties_break_to_earliest_registration() {
        let mut resolver = ModelConditionResolver::new();
        resolver.register_state(state("first", ModelConditionFlags::MOVING));
        resolver.register_state(state("second", ModelConditionFlags::DAMAGED));

        let (_, best) = resolver
            .find_best_state(ModelConditionFlags::MOVING | ModelConditionFlags::DAMAGED)
            .expect("both match at population 1");
        assert_eq!(best.name, "first");
    }

    #[test]
    fn test_many_to_one_condition_sets() {
        let mut resolver = ModelConditionResolver::new();
        resolver.register_state(state("default", ModelConditionFlags::empty()));
        resolver.register_state(
            state("hurt", ModelConditionFlags::DAMAGED)
                .with_condition_set(ModelConditionFlags::REALLY_DAMAGED),
        );

        let (_, a) = resolver
            .find_best_state(ModelConditionFlags::DAMAGED)
            .unwrap();
        let (_, b) = resolver
            .find_best_state(ModelConditionFlags::REALLY_DAMAGED)
            .unwrap();
        assert_eq!(a.name, "hurt");
        assert_eq!(b.name, "hurt");
    }

    #[test]
    fn test_no_match_returns_sentinel() {
        let mut resolver = ModelConditionResolver::new();
        resolver.register_state(state("moving_only", ModelConditionFlags::MOVING));

        assert!(resolver
            .find_best_state(ModelConditionFlags::DAMAGED)
            .is_none());
    }

    #[test]
    fn test_transition_lookup_is_unordered_and_optional() {
        let mut resolver = ModelConditionResolver::new();
        let stand = resolver.register_state(state("stand", ModelConditionFlags::empty()));
        let walk = resolver.register_state(state("walk", ModelConditionFlags::MOVING));
        let rubble = resolver.register_state(state("rubble", ModelConditionFlags::RUBBLE));
        resolver.register_transition(stand, walk, state("stand_to_walk", ModelConditionFlags::empty()));

        let forward = resolver.find_transition(stand, walk);
        let backward = resolver.find_transition(walk, stand);
        assert!(forward.is_some());
        assert_eq!(
            forward.map(|(i, _)| i),
            backward.map(|(i, _)| i),
            "pair signature is unordered"
        );

        // Unauthored pair: straight cut, not an error.
        assert!(resolver.find_transition(stand, rubble).is_none());
    }
}
