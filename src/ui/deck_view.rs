// Deck view - draws the deck grid and the labware sitting on it
//
// Read-only: takes the store by shared reference and never mutates it.

use crate::labware::deck::{self, DECK_COLS, DECK_ROWS, DeckCell};
use crate::labware::state::{GRID_COLS, GRID_ROWS, LabwareState};
use crate::labware::store::LabwareStore;
use crate::protocol::well::WellCoord;
use eframe::egui;
use egui::{Color32, Painter, Pos2, Rect, Sense, Ui, Vec2};

/// Reservoir column fill level in `[0, 1]`
///
/// Overfilled columns draw as full.
pub fn fill_fraction(volume: f64, capacity: f64) -> f32 {
    if capacity <= 0.0 {
        return 0.0;
    }
    (volume / capacity).clamp(0.0, 1.0) as f32
}

/// Plate well colour: white when empty, pale to full blue as it fills
///
/// Any liquid at all gets a visible tint.
pub fn well_color(volume: f64, capacity: f64) -> Color32 {
    if volume <= 0.0 {
        return Color32::WHITE;
    }
    let strength = 0.25 + 0.75 * fill_fraction(volume, capacity);
    let shade = |pale: u8| (pale as f32 * (1.0 - strength)).round() as u8;
    Color32::from_rgb(shade(190), shade(200), 255)
}

/// Deck drawing parameters
pub struct DeckView {
    slot_size: Vec2,
    gap: f32,
    well_diameter: f32,
    well_spacing: f32,
    tip_diameter: f32,
    tip_spacing: f32,
    well_capacity: f64,
}

impl Default for DeckView {
    fn default() -> Self {
        Self {
            slot_size: Vec2::new(200.0, 150.0),
            gap: 5.0,
            well_diameter: 10.0,
            well_spacing: 5.0,
            tip_diameter: 8.0,
            tip_spacing: 5.0,
            well_capacity: 360.0,
        }
    }
}

impl DeckView {
    /// Volume at which a plate well draws fully saturated
    pub fn with_well_capacity(mut self, capacity: f64) -> Self {
        self.well_capacity = capacity;
        self
    }

    /// Total size of the deck drawing
    pub fn desired_size(&self) -> Vec2 {
        Vec2::new(
            DECK_COLS as f32 * (self.slot_size.x + self.gap),
            DECK_ROWS as f32 * (self.slot_size.y + self.gap),
        )
    }

    /// Draw the deck; labware is drawn only when `show_labware` is set
    pub fn show(&self, ui: &mut Ui, store: &LabwareStore, show_labware: bool) {
        let (response, painter) = ui.allocate_painter(self.desired_size(), Sense::hover());
        let origin = response.rect.min;

        self.draw_grid(&painter, origin);

        if !show_labware {
            return;
        }

        for (key, state) in store.iter() {
            let rect = self.cell_rect(origin, deck::slot_cell_or_origin(key.slot));
            match state {
                LabwareState::Reservoir(columns) => {
                    self.draw_reservoir(&painter, rect, columns, store.reservoir_capacity())
                }
                LabwareState::WellPlate(_) | LabwareState::TipRack(_) => {
                    self.draw_grid_labware(&painter, rect, state)
                }
            }
        }
    }

    fn cell_rect(&self, origin: Pos2, cell: DeckCell) -> Rect {
        let min = origin
            + Vec2::new(
                cell.col as f32 * (self.slot_size.x + self.gap),
                cell.row as f32 * (self.slot_size.y + self.gap),
            );
        Rect::from_min_size(min, self.slot_size)
    }

    fn draw_grid(&self, painter: &Painter, origin: Pos2) {
        for (cell, slot) in deck::cells() {
            // Empty corner is left blank
            let Some(slot) = slot else { continue };
            let rect = self.cell_rect(origin, cell);
            painter.rect_filled(rect, 0.0, Color32::from_gray(200));
            painter.rect_stroke(rect, 0.0, (1.0, Color32::from_gray(100)));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                slot.to_string(),
                egui::FontId::proportional(20.0),
                Color32::from_gray(100),
            );
        }
    }

    fn draw_reservoir(&self, painter: &Painter, rect: Rect, columns: &[f64], capacity: f64) {
        let column_width = rect.width() / GRID_COLS as f32;
        let column_height = rect.height() * 0.9;
        let top = rect.top() + (rect.height() - column_height) / 2.0;

        for (i, volume) in columns.iter().enumerate() {
            let left = rect.left() + i as f32 * column_width;
            let outline = Rect::from_min_size(
                Pos2::new(left, top),
                Vec2::new(column_width, column_height),
            );

            let level = fill_fraction(*volume, capacity);
            let liquid = Rect::from_min_max(
                Pos2::new(left, outline.bottom() - level * column_height),
                outline.max,
            );

            painter.rect_filled(liquid, 0.0, Color32::LIGHT_BLUE);
            painter.rect_stroke(outline, 0.0, (1.0, Color32::BLACK));
        }
    }

    /// Plates and tip racks: one circle per cell, blue when filled or present
    fn draw_grid_labware(&self, painter: &Painter, rect: Rect, state: &LabwareState) {
        let (diameter, spacing) = match state {
            LabwareState::TipRack(_) => (self.tip_diameter, self.tip_spacing),
            _ => (self.well_diameter, self.well_spacing),
        };
        let pitch = diameter + spacing;
        let size = Vec2::new(GRID_COLS as f32 * pitch, GRID_ROWS as f32 * pitch);
        let start = rect.min + (rect.size() - size) / 2.0 + Vec2::splat(pitch / 2.0);

        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                let coord = WellCoord::new(row, col);
                let fill = match state {
                    LabwareState::WellPlate(_) => {
                        well_color(state.well_volume(coord).unwrap_or(0.0), self.well_capacity)
                    }
                    LabwareState::TipRack(_) if state.tip_available(coord) == Some(true) => {
                        Color32::BLUE
                    }
                    _ => Color32::WHITE,
                };

                let center = start + Vec2::new(col as f32 * pitch, row as f32 * pitch);
                painter.circle_filled(center, diameter / 2.0, fill);
                painter.circle_stroke(center, diameter / 2.0, (1.0, Color32::BLACK));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_fraction() {
        assert_eq!(fill_fraction(15000.0, 15000.0), 1.0);
        assert_eq!(fill_fraction(7500.0, 15000.0), 0.5);
        assert_eq!(fill_fraction(20000.0, 15000.0), 1.0);
        assert_eq!(fill_fraction(0.0, 15000.0), 0.0);
        assert_eq!(fill_fraction(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_well_color_tracks_plate_capacity() {
        assert_eq!(well_color(0.0, 360.0), Color32::WHITE);
        assert_eq!(well_color(360.0, 360.0), Color32::from_rgb(0, 0, 255));
        assert_eq!(well_color(900.0, 360.0), Color32::from_rgb(0, 0, 255));

        // A trace of liquid is tinted, half a well is darker still
        let trace = well_color(1.0, 360.0);
        let half = well_color(180.0, 360.0);
        assert_ne!(trace, Color32::WHITE);
        assert!(half.r() < trace.r());
        assert!(half.g() < trace.g());

        // Same volume reads fuller on a smaller well
        assert!(well_color(100.0, 200.0).r() < well_color(100.0, 2000.0).r());
    }

    #[test]
    fn test_desired_size_covers_grid() {
        let view = DeckView::default();
        assert_eq!(view.desired_size(), Vec2::new(615.0, 620.0));
    }
}
