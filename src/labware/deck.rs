// Deck layout - fixed mapping of slot numbers to a 4 x 3 grid
//
// Top row holds slots 10 and 11 plus an empty cell (the trash position on
// the real deck), bottom row holds 1-3. Only the renderer reads this.

use crate::protocol::command::Slot;

pub const DECK_ROWS: usize = 4;
pub const DECK_COLS: usize = 3;

static SLOT_GRID: [[Option<Slot>; DECK_COLS]; DECK_ROWS] = [
    [Some(10), Some(11), None],
    [Some(7), Some(8), Some(9)],
    [Some(4), Some(5), Some(6)],
    [Some(1), Some(2), Some(3)],
];

/// Cell of the deck grid, row 0 at the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeckCell {
    pub row: usize,
    pub col: usize,
}

/// Grid cell holding `slot`, `None` for unknown slots
pub fn slot_cell(slot: Slot) -> Option<DeckCell> {
    cells().find_map(|(cell, s)| (s == Some(slot)).then_some(cell))
}

/// Grid cell for drawing; unknown slots fall back to the top-left cell
pub fn slot_cell_or_origin(slot: Slot) -> DeckCell {
    slot_cell(slot).unwrap_or_default()
}

/// Every grid cell with its slot, row by row
pub fn cells() -> impl Iterator<Item = (DeckCell, Option<Slot>)> {
    SLOT_GRID.iter().enumerate().flat_map(|(row, line)| {
        line.iter()
            .enumerate()
            .map(move |(col, slot)| (DeckCell { row, col }, *slot))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_slots() {
        assert_eq!(slot_cell(1), Some(DeckCell { row: 3, col: 0 }));
        assert_eq!(slot_cell(5), Some(DeckCell { row: 2, col: 1 }));
        assert_eq!(slot_cell(11), Some(DeckCell { row: 0, col: 1 }));
    }

    #[test]
    fn test_unknown_slot_falls_back() {
        assert_eq!(slot_cell(0), None);
        assert_eq!(slot_cell(12), None);
        assert_eq!(slot_cell_or_origin(12), DeckCell { row: 0, col: 0 });
    }

    #[test]
    fn test_every_slot_once() {
        let mut slots: Vec<Slot> = cells().filter_map(|(_, slot)| slot).collect();
        slots.sort_unstable();
        assert_eq!(slots, (1..=11).collect::<Vec<_>>());
        assert_eq!(cells().count(), DECK_ROWS * DECK_COLS);
    }
}
