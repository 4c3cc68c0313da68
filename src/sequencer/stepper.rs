// Simulation stepper - walks the command list one step at a time

use crate::labware::store::{ApplyOutcome, LabwareStore, SlotKey};
use crate::protocol::command::Command;
use std::collections::BTreeSet;

/// Stepper state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepperState {
    /// Nothing loaded (or an empty log)
    #[default]
    Idle,
    Running,
    /// Every command has been applied
    Exhausted,
}

impl StepperState {
    pub fn is_running(&self) -> bool {
        matches!(self, StepperState::Running)
    }
}

/// One applied step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Position of the command in the sequence
    pub index: usize,
    pub command: Command,
    pub outcome: ApplyOutcome,
}

/// Command sequence plus a cursor into it
#[derive(Debug, Clone, Default)]
pub struct Stepper {
    commands: Vec<Command>,
    cursor: usize,
    state: StepperState,
}

impl Stepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a sequence and create state for every slot it references
    ///
    /// Slots are initialised up front, before the first step is applied.
    pub fn start(&mut self, commands: Vec<Command>, store: &mut LabwareStore) -> StepperState {
        let keys: BTreeSet<SlotKey> = commands.iter().map(SlotKey::of).collect();
        for key in keys {
            store.ensure_slot(key.kind, key.slot);
        }

        self.commands = commands;
        self.cursor = 0;
        self.state = if self.commands.is_empty() {
            StepperState::Idle
        } else {
            StepperState::Running
        };
        self.state
    }

    /// Apply the command under the cursor and advance
    ///
    /// Returns `None` once the sequence is exhausted.
    pub fn step(&mut self, store: &mut LabwareStore) -> Option<StepReport> {
        if !self.state.is_running() {
            return None;
        }

        let index = self.cursor;
        let command = *self.commands.get(index)?;
        let outcome = store.apply_command(&command);
        self.cursor += 1;

        if self.cursor >= self.commands.len() {
            self.state = StepperState::Exhausted;
        }

        Some(StepReport {
            index,
            command,
            outcome,
        })
    }

    /// Forget the sequence and return to Idle
    pub fn reset(&mut self) {
        self.commands.clear();
        self.cursor = 0;
        self.state = StepperState::Idle;
    }

    pub fn state(&self) -> StepperState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::command::{Action, LabwareKind};
    use crate::protocol::well::WellCoord;

    fn sample() -> Vec<Command> {
        vec![
            Command::pickup_tip(3, WellCoord::new(0, 0)),
            Command::reservoir(Action::Aspirate, 1, 0, 100.0),
            Command::well_plate(Action::Dispense, 5, WellCoord::new(0, 0), 100.0),
        ]
    }

    #[test]
    fn test_start_initialises_all_slots() {
        let mut store = LabwareStore::default();
        let mut stepper = Stepper::new();

        assert_eq!(stepper.start(sample(), &mut store), StepperState::Running);
        assert_eq!(store.len(), 3);
        assert!(store.get(LabwareKind::WellPlate, 5).is_some());
        assert_eq!(stepper.cursor(), 0);
    }

    #[test]
    fn test_empty_sequence_stays_idle() {
        let mut store = LabwareStore::default();
        let mut stepper = Stepper::new();

        assert_eq!(stepper.start(Vec::new(), &mut store), StepperState::Idle);
        assert!(stepper.step(&mut store).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_steps_until_exhausted() {
        let mut store = LabwareStore::default();
        let mut stepper = Stepper::new();
        stepper.start(sample(), &mut store);

        for expected in 0..3 {
            let report = stepper.step(&mut store).unwrap();
            assert_eq!(report.index, expected);
            assert_eq!(report.outcome, ApplyOutcome::Applied);
        }

        assert_eq!(stepper.state(), StepperState::Exhausted);
        assert_eq!(stepper.cursor(), 3);
        assert!(stepper.step(&mut store).is_none());

        let plate = store.get(LabwareKind::WellPlate, 5).unwrap();
        assert_eq!(plate.well_volume(WellCoord::new(0, 0)), Some(100.0));
    }

    #[test]
    fn test_reset() {
        let mut store = LabwareStore::default();
        let mut stepper = Stepper::new();
        stepper.start(sample(), &mut store);
        stepper.step(&mut store);

        stepper.reset();
        assert_eq!(stepper.state(), StepperState::Idle);
        assert_eq!(stepper.cursor(), 0);
        assert!(stepper.is_empty());
    }
}
