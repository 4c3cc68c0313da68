// Well coordinates - converts labels like "H12" into grid indices

use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based grid cell on a plate or tip rack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WellCoord {
    pub row: usize,
    pub col: usize,
}

impl WellCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Resolve a well label (`<letter><number>`) into a grid cell
    ///
    /// Row is the letter offset from 'A', column is the number minus one.
    /// No range check against the labware size is done: "Z40" resolves to
    /// (25, 39) and "A0" wraps to column `usize::MAX`, both of which simply
    /// never land on a real cell. Returns `None` only when the label is not
    /// a letter from 'A' on followed by digits.
    pub fn from_label(label: &str) -> Option<Self> {
        let mut chars = label.chars();
        let letter = chars.next()?;
        let row = (letter as u32).checked_sub('A' as u32)? as usize;
        let col = column_index(chars.as_str())?;

        Some(Self { row, col })
    }

    /// Human readable label, inverse of `from_label` for rows A-Z
    pub fn label(&self) -> String {
        match char::from_u32('A' as u32 + self.row as u32) {
            Some(letter) => format!("{}{}", letter, self.col.wrapping_add(1)),
            None => format!("?{}", self.col.wrapping_add(1)),
        }
    }
}

/// One-based column number (ASCII digits) to a zero-based index
///
/// Column 0 wraps to `usize::MAX` and numbers too large for `usize`
/// saturate; either way the index addresses no cell.
pub fn column_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number: usize = digits.parse().unwrap_or(usize::MAX);
    Some(number.wrapping_sub(1))
}

impl fmt::Display for WellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
