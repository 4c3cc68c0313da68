// Labware state store - one state object per (labware kind, slot)

use super::state::LabwareState;
use crate::protocol::command::{Command, LabwareKind, Slot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of a state object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub kind: LabwareKind,
    pub slot: Slot,
}

impl SlotKey {
    pub fn new(kind: LabwareKind, slot: Slot) -> Self {
        Self { kind, slot }
    }

    pub fn of(command: &Command) -> Self {
        Self::new(command.labware(), command.slot())
    }
}

/// What happened when a command was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Slot was never initialised; command dropped
    NoState,
    /// Location outside the labware grid; command dropped
    OutOfRange,
}

/// Serializable view of one slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSnapshot {
    pub kind: LabwareKind,
    pub slot: Slot,
    pub state: LabwareState,
}

/// Labware state, created lazily and kept until reset
#[derive(Debug, Clone, PartialEq)]
pub struct LabwareStore {
    reservoir_capacity: f64,
    slots: BTreeMap<SlotKey, LabwareState>,
}

impl LabwareStore {
    pub fn new(reservoir_capacity: f64) -> Self {
        Self {
            reservoir_capacity,
            slots: BTreeMap::new(),
        }
    }

    /// Create the default state for a slot if it does not exist yet
    pub fn ensure_slot(&mut self, kind: LabwareKind, slot: Slot) {
        let capacity = self.reservoir_capacity;
        self.slots
            .entry(SlotKey::new(kind, slot))
            .or_insert_with(|| match kind {
                LabwareKind::Reservoir => LabwareState::full_reservoir(capacity),
                LabwareKind::WellPlate => LabwareState::empty_plate(),
                LabwareKind::TipRack => LabwareState::full_tip_rack(),
            });
    }

    /// Apply a command to its slot; a slot with no state is left alone
    pub fn apply_command(&mut self, command: &Command) -> ApplyOutcome {
        match self.slots.get_mut(&SlotKey::of(command)) {
            None => ApplyOutcome::NoState,
            Some(state) => {
                if state.apply(command) {
                    ApplyOutcome::Applied
                } else {
                    ApplyOutcome::OutOfRange
                }
            }
        }
    }

    pub fn get(&self, kind: LabwareKind, slot: Slot) -> Option<&LabwareState> {
        self.slots.get(&SlotKey::new(kind, slot))
    }

    /// All initialised slots, ordered by kind then slot
    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &LabwareState)> {
        self.slots.iter().map(|(key, state)| (*key, state))
    }

    pub fn snapshot(&self) -> Vec<SlotSnapshot> {
        self.iter()
            .map(|(key, state)| SlotSnapshot {
                kind: key.kind,
                slot: key.slot,
                state: state.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every state object
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn reservoir_capacity(&self) -> f64 {
        self.reservoir_capacity
    }
}

impl Default for LabwareStore {
    fn default() -> Self {
        Self::new(crate::config::LabwareCatalog::default().reservoir_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::command::Action;
    use crate::protocol::well::WellCoord;

    #[test]
    fn test_ensure_slot_idempotent() {
        let mut store = LabwareStore::default();
        store.ensure_slot(LabwareKind::Reservoir, 1);
        store.apply_command(&Command::reservoir(Action::Aspirate, 1, 0, 50.0));
        store.ensure_slot(LabwareKind::Reservoir, 1);

        let state = store.get(LabwareKind::Reservoir, 1).unwrap();
        assert_eq!(state.column_volume(0), Some(14950.0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_uninitialised_slot_is_noop() {
        let mut store = LabwareStore::default();
        let outcome = store.apply_command(&Command::pickup_tip(3, WellCoord::new(0, 0)));
        assert_eq!(outcome, ApplyOutcome::NoState);
        assert!(store.is_empty());
    }

    #[test]
    fn test_kinds_share_slot_numbers_independently() {
        let mut store = LabwareStore::default();
        store.ensure_slot(LabwareKind::Reservoir, 2);
        store.ensure_slot(LabwareKind::TipRack, 2);
        assert_eq!(store.len(), 2);

        // Reservoir on slot 2 does not make a plate command valid there
        let outcome = store.apply_command(&Command::well_plate(
            Action::Dispense,
            2,
            WellCoord::new(0, 0),
            1.0,
        ));
        assert_eq!(outcome, ApplyOutcome::NoState);
    }

    #[test]
    fn test_out_of_range_outcome() {
        let mut store = LabwareStore::default();
        store.ensure_slot(LabwareKind::Reservoir, 1);
        let outcome = store.apply_command(&Command::reservoir(Action::Aspirate, 1, 40, 1.0));
        assert_eq!(outcome, ApplyOutcome::OutOfRange);
    }

    #[test]
    fn test_custom_capacity() {
        let mut store = LabwareStore::new(290_000.0);
        store.ensure_slot(LabwareKind::Reservoir, 4);
        let state = store.get(LabwareKind::Reservoir, 4).unwrap();
        assert_eq!(state.column_volume(5), Some(290_000.0));
    }
}
