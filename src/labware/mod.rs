// Labware - deck layout and per-slot volume / tip state

pub mod deck;
pub mod state;
pub mod store;

pub use deck::{DeckCell, slot_cell, slot_cell_or_origin};
pub use state::{GRID_COLS, GRID_ROWS, LabwareState};
pub use store::{ApplyOutcome, LabwareStore, SlotKey, SlotSnapshot};
