//! # Slots
//!
//! Five independent tracked-resource configurations, addressed by [`SlotIndex`], and
//! the `OFF -> 1 -> ... -> 5 -> OFF` selection cycle over them.

use std::fmt;

/// Number of slots. Fixed.
pub const SLOT_COUNT: usize = 5;

/// A slot number in `1..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Returns the slot numbered `number`, or `None` outside `1..=5`.
    pub fn new(number: u8) -> Option<Self> {
        (1..=SLOT_COUNT as u8)
            .contains(&number)
            .then_some(Self(number))
    }

    /// Every slot in ascending order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (1..=SLOT_COUNT as u8).map(SlotIndex)
    }

    /// The 1-based slot number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// The 0-based index into slot-indexed arrays.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The slot controller's state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SlotSelection {
    /// Nothing rendered, nothing scanned.
    #[default]
    Off,
    /// One slot is live.
    Slot(SlotIndex),
}

impl SlotSelection {
    /// Builds a selection from the persisted `active_slot` number (0 = off).
    pub fn from_number(number: u8) -> Self {
        SlotIndex::new(number).map_or(SlotSelection::Off, SlotSelection::Slot)
    }

    /// The persisted form: the slot number, or 0 when off.
    pub fn number(self) -> u8 {
        match self {
            SlotSelection::Off => 0,
            SlotSelection::Slot(slot) => slot.number(),
        }
    }

    /// The selected slot, if any.
    pub fn slot(self) -> Option<SlotIndex> {
        match self {
            SlotSelection::Off => None,
            SlotSelection::Slot(slot) => Some(slot),
        }
    }

    /// The next state in the cycle, skipping slots for which `is_configured` is false.
    /// With nothing configured the cycle stays at [`SlotSelection::Off`].
    pub fn next(self, is_configured: impl Fn(SlotIndex) -> bool) -> Self {
        let after = match self {
            SlotSelection::Off => 0,
            SlotSelection::Slot(slot) => slot.number(),
        };
        SlotIndex::all()
            .filter(|slot| slot.number() > after)
            .find(|slot| is_configured(*slot))
            .map_or(SlotSelection::Off, SlotSelection::Slot)
    }
}

impl fmt::Display for SlotSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotSelection::Off => f.write_str("OFF"),
            SlotSelection::Slot(slot) => write!(f, "slot {}", slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(n: u8) -> SlotSelection {
        SlotSelection::Slot(SlotIndex::new(n).unwrap())
    }

    #[test]
    fn slot_numbers_are_bounded() {
        assert!(SlotIndex::new(0).is_none());
        assert!(SlotIndex::new(6).is_none());
        assert_eq!(SlotIndex::new(5).map(SlotIndex::index), Some(4));
        assert_eq!(SlotIndex::all().count(), SLOT_COUNT);
    }

    #[test]
    fn cycle_skips_unconfigured_slots() {
        let configured = |s: SlotIndex| s.number() == 1 || s.number() == 3;

        let first = SlotSelection::Off.next(configured);
        let second = first.next(configured);
        let third = second.next(configured);

        assert_eq!(first, slot(1));
        assert_eq!(second, slot(3));
        assert_eq!(third, SlotSelection::Off);
    }

    #[test]
    fn cycle_with_nothing_configured_stays_off() {
        assert_eq!(SlotSelection::Off.next(|_| false), SlotSelection::Off);
        assert_eq!(slot(4).next(|_| false), SlotSelection::Off);
    }

    #[test]
    fn full_cycle_visits_every_slot() {
        let mut state = SlotSelection::Off;
        let mut visited = Vec::new();
        for _ in 0..6 {
            state = state.next(|_| true);
            visited.push(state.number());
        }
        assert_eq!(visited, vec![1, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn persisted_numbers_round_trip() {
        assert_eq!(SlotSelection::from_number(0), SlotSelection::Off);
        assert_eq!(SlotSelection::from_number(9), SlotSelection::Off);
        assert_eq!(SlotSelection::from_number(2).number(), 2);
    }
}
