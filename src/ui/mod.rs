// UI - egui front end over a SimulationSession

pub mod app;
pub mod deck_view;

pub use app::ReplayApp;
pub use deck_view::DeckView;
