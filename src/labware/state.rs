// Per-slot labware state - volumes and tip availability

use crate::protocol::command::{Action, Command, LabwareKind, Location};
use crate::protocol::well::WellCoord;
use serde::{Deserialize, Serialize};

/// Rows on a 96-format plate or rack
pub const GRID_ROWS: usize = 8;
/// Columns on a 96-format plate or rack (also reservoir columns)
pub const GRID_COLS: usize = 12;

pub const TIP_AVAILABLE: u8 = 1;
pub const TIP_USED: u8 = 0;

/// Current contents of one piece of labware
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LabwareState {
    /// Column volumes in µL
    Reservoir(Vec<f64>),
    /// Well volumes in µL, `[row][col]`
    WellPlate(Vec<Vec<f64>>),
    /// Tip flags, `[row][col]`, 1 = available
    TipRack(Vec<Vec<u8>>),
}

impl LabwareState {
    /// Every column filled to `capacity`
    pub fn full_reservoir(capacity: f64) -> Self {
        LabwareState::Reservoir(vec![capacity; GRID_COLS])
    }

    pub fn empty_plate() -> Self {
        LabwareState::WellPlate(vec![vec![0.0; GRID_COLS]; GRID_ROWS])
    }

    pub fn full_tip_rack() -> Self {
        LabwareState::TipRack(vec![vec![TIP_AVAILABLE; GRID_COLS]; GRID_ROWS])
    }

    pub fn kind(&self) -> LabwareKind {
        match self {
            LabwareState::Reservoir(_) => LabwareKind::Reservoir,
            LabwareState::WellPlate(_) => LabwareKind::WellPlate,
            LabwareState::TipRack(_) => LabwareKind::TipRack,
        }
    }

    /// Apply one command to this labware
    ///
    /// Volumes never go below zero; there is no upper clamp, so dispensing
    /// can overfill past nominal capacity. Locations outside the grid are
    /// ignored. Returns true if a cell was addressed.
    pub fn apply(&mut self, command: &Command) -> bool {
        match (self, command.location()) {
            (LabwareState::Reservoir(columns), Location::Column(index)) => {
                let Some(level) = columns.get_mut(index) else {
                    return false;
                };
                *level = adjust(*level, command.action(), command.volume());
                true
            }
            (LabwareState::WellPlate(wells), Location::Well(coord)) => {
                let Some(level) = cell_mut(wells, coord) else {
                    return false;
                };
                *level = adjust(*level, command.action(), command.volume());
                true
            }
            (LabwareState::TipRack(tips), Location::Well(coord)) => {
                if command.action() != Action::PickupTip {
                    return false;
                }
                let Some(tip) = cell_mut(tips, coord) else {
                    return false;
                };
                *tip = TIP_USED;
                true
            }
            _ => false,
        }
    }

    /// Reservoir column volume
    pub fn column_volume(&self, index: usize) -> Option<f64> {
        match self {
            LabwareState::Reservoir(columns) => columns.get(index).copied(),
            _ => None,
        }
    }

    /// Plate well volume
    pub fn well_volume(&self, coord: WellCoord) -> Option<f64> {
        match self {
            LabwareState::WellPlate(wells) => wells.get(coord.row)?.get(coord.col).copied(),
            _ => None,
        }
    }

    /// Whether the tip at `coord` is still in the rack
    pub fn tip_available(&self, coord: WellCoord) -> Option<bool> {
        match self {
            LabwareState::TipRack(tips) => tips
                .get(coord.row)?
                .get(coord.col)
                .map(|flag| *flag == TIP_AVAILABLE),
            _ => None,
        }
    }
}

fn adjust(level: f64, action: Action, volume: f64) -> f64 {
    let next = match action {
        Action::Aspirate => level - volume,
        Action::Dispense => level + volume,
        Action::PickupTip => level,
    };
    next.max(0.0)
}

fn cell_mut<T>(grid: &mut [Vec<T>], coord: WellCoord) -> Option<&mut T> {
    grid.get_mut(coord.row)?.get_mut(coord.col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let reservoir = LabwareState::full_reservoir(15000.0);
        assert_eq!(reservoir.column_volume(0), Some(15000.0));
        assert_eq!(reservoir.column_volume(11), Some(15000.0));
        assert_eq!(reservoir.column_volume(12), None);

        let plate = LabwareState::empty_plate();
        assert_eq!(plate.well_volume(WellCoord::new(7, 11)), Some(0.0));

        let rack = LabwareState::full_tip_rack();
        assert_eq!(rack.tip_available(WellCoord::new(3, 4)), Some(true));
    }

    #[test]
    fn test_aspirate_floors_at_zero() {
        let mut reservoir = LabwareState::full_reservoir(15000.0);
        reservoir.apply(&Command::reservoir(Action::Aspirate, 1, 2, 1e9));
        assert_eq!(reservoir.column_volume(2), Some(0.0));

        let mut plate = LabwareState::empty_plate();
        plate.apply(&Command::well_plate(Action::Aspirate, 1, WellCoord::new(0, 0), 10.0));
        assert_eq!(plate.well_volume(WellCoord::new(0, 0)), Some(0.0));
    }

    #[test]
    fn test_dispense_can_overfill() {
        let mut reservoir = LabwareState::full_reservoir(15000.0);
        reservoir.apply(&Command::reservoir(Action::Dispense, 1, 0, 500.0));
        assert_eq!(reservoir.column_volume(0), Some(15500.0));
    }

    #[test]
    fn test_tip_pickup_idempotent() {
        let mut rack = LabwareState::full_tip_rack();
        let cmd = Command::pickup_tip(3, WellCoord::new(0, 0));
        rack.apply(&cmd);
        let once = rack.clone();
        rack.apply(&cmd);
        assert_eq!(rack, once);
        assert_eq!(rack.tip_available(WellCoord::new(0, 0)), Some(false));
    }

    #[test]
    fn test_out_of_grid_is_ignored() {
        let mut plate = LabwareState::empty_plate();
        let before = plate.clone();
        let applied = plate.apply(&Command::well_plate(
            Action::Dispense,
            1,
            WellCoord::new(25, 39),
            10.0,
        ));
        assert!(!applied);
        assert_eq!(plate, before);
    }

    #[test]
    fn test_mismatched_kind_is_ignored() {
        let mut rack = LabwareState::full_tip_rack();
        assert!(!rack.apply(&Command::reservoir(Action::Aspirate, 1, 0, 5.0)));
    }
}
