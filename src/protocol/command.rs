// Instrument command types

use super::well::WellCoord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deck slot number (1-11 on a real deck)
pub type Slot = u32;

/// Kind of vessel a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LabwareKind {
    Reservoir,
    WellPlate,
    TipRack,
}

impl LabwareKind {
    pub fn name(&self) -> &'static str {
        match self {
            LabwareKind::Reservoir => "reservoir",
            LabwareKind::WellPlate => "well plate",
            LabwareKind::TipRack => "tip rack",
        }
    }
}

impl fmt::Display for LabwareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Liquid handling action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Aspirate,
    Dispense,
    PickupTip,
}

/// Where on the labware a command lands
///
/// Reservoirs are addressed by column, plates and tip racks by grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Column(usize),
    Well(WellCoord),
}

/// One parsed instrument action
///
/// Fields are private so that a command can only be built through the
/// constructors below, which pair each labware kind with its location shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Command {
    labware: LabwareKind,
    action: Action,
    slot: Slot,
    location: Location,
    volume: f64,
}

impl Command {
    pub fn reservoir(action: Action, slot: Slot, well_index: usize, volume: f64) -> Self {
        Self {
            labware: LabwareKind::Reservoir,
            action,
            slot,
            location: Location::Column(well_index),
            volume: volume.max(0.0),
        }
    }

    pub fn well_plate(action: Action, slot: Slot, well: WellCoord, volume: f64) -> Self {
        Self {
            labware: LabwareKind::WellPlate,
            action,
            slot,
            location: Location::Well(well),
            volume: volume.max(0.0),
        }
    }

    pub fn pickup_tip(slot: Slot, well: WellCoord) -> Self {
        Self {
            labware: LabwareKind::TipRack,
            action: Action::PickupTip,
            slot,
            location: Location::Well(well),
            volume: 0.0,
        }
    }

    pub fn labware(&self) -> LabwareKind {
        self.labware
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Volume in µL (always 0 for tip pickups)
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Reservoir column, if this is a reservoir command
    pub fn well_index(&self) -> Option<usize> {
        match self.location {
            Location::Column(index) => Some(index),
            Location::Well(_) => None,
        }
    }

    /// Grid cell, if this is a plate or tip rack command
    pub fn well(&self) -> Option<WellCoord> {
        match self.location {
            Location::Well(coord) => Some(coord),
            Location::Column(_) => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let place = match self.location {
            Location::Column(index) => format!("A{}", index.wrapping_add(1)),
            Location::Well(coord) => coord.label(),
        };
        match self.action {
            Action::Aspirate => write!(
                f,
                "aspirate {:.1} uL from {} of {} on slot {}",
                self.volume, place, self.labware, self.slot
            ),
            Action::Dispense => write!(
                f,
                "dispense {:.1} uL into {} of {} on slot {}",
                self.volume, place, self.labware, self.slot
            ),
            Action::PickupTip => write!(
                f,
                "pick up tip {} of {} on slot {}",
                place, self.labware, self.slot
            ),
        }
    }
}
