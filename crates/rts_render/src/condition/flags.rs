//! Model condition bitset
//!
//! A fixed-width bit vector of boolean simulation facts (damaged, moving,
//! night, ...) that drives visual state selection. The simulation side sets
//! these; the draw side only ever reads them.

use bitflags::bitflags;

bitflags! {
    /// Boolean simulation facts that select a model's visual state
    ///
    /// Authors combine these into condition sets on
    /// [`crate::condition::ModelConditionState`] entries; the resolver picks
    /// the most specific registered set that is a subset of an object's
    /// current flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModelConditionFlags: u128 {
        /// First damage tier
        const DAMAGED            = 1 << 0;
        /// Second damage tier
        const REALLY_DAMAGED     = 1 << 1;
        /// Destroyed, showing rubble geometry
        const RUBBLE             = 1 << 2;
        /// Night-time art variant
        const NIGHT              = 1 << 3;
        /// Snow-covered art variant
        const SNOW               = 1 << 4;
        /// The object is moving
        const MOVING             = 1 << 5;
        /// The object is turning in place
        const TURNING            = 1 << 6;
        /// Primary weapon slot is firing
        const FIRING_A           = 1 << 7;
        /// Secondary weapon slot is firing
        const FIRING_B           = 1 << 8;
        /// Tertiary weapon slot is firing
        const FIRING_C           = 1 << 9;
        /// Primary weapon slot is reloading
        const RELOADING_A        = 1 << 10;
        /// Secondary weapon slot is reloading
        const RELOADING_B        = 1 << 11;
        /// Tertiary weapon slot is reloading
        const RELOADING_C        = 1 << 12;
        /// Primary weapon slot is between shots of a burst
        const BETWEEN_SHOTS_A    = 1 << 13;
        /// The object is playing its death sequence
        const DYING              = 1 << 14;
        /// A production/garrison door is opening
        const DOOR_1_OPENING     = 1 << 15;
        /// A production/garrison door is closing
        const DOOR_1_CLOSING     = 1 << 16;
        /// Infantry is garrisoned inside
        const GARRISONED         = 1 << 17;
        /// Carrying a payload or passenger
        const CARRYING           = 1 << 18;
        /// Transport is loaded
        const LOADED             = 1 << 19;
        /// Over water rather than land
        const OVER_WATER         = 1 << 20;
        /// The object's power is disabled
        const UNPOWERED          = 1 << 21;
        /// Under construction
        const CONSTRUCTION       = 1 << 22;
        /// Cloaked / stealth look
        const STEALTHED          = 1 << 23;
    }
}

impl ModelConditionFlags {
    /// Number of asserted bits; the resolver's specificity measure
    pub fn population(self) -> u32 {
        self.bits().count_ones()
    }

    /// True when every bit of `self` is present in `other`
    ///
    /// Extra bits in `other` are ignored, which is what lets authors define
    /// states without enumerating every unrelated condition.
    pub fn is_subset_of(self, other: Self) -> bool {
        other.contains(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_counts_asserted_bits() {
        assert_eq!(ModelConditionFlags::empty().population(), 0);
        assert_eq!(
            (ModelConditionFlags::DAMAGED | ModelConditionFlags::MOVING).population(),
            2
        );
    }

    #[test]
    fn test_subset_ignores_extra_bits() {
        let entry = ModelConditionFlags::MOVING | ModelConditionFlags::DAMAGED;
        let flags =
            ModelConditionFlags::MOVING | ModelConditionFlags::DAMAGED | ModelConditionFlags::NIGHT;

        assert!(entry.is_subset_of(flags));
        assert!(!flags.is_subset_of(entry));
        assert!(ModelConditionFlags::empty().is_subset_of(flags));
    }
}
