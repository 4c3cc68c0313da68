// Labware Replay - Library exports for the binaries, tests and benchmarks

pub mod config;
pub mod labware;
pub mod messaging;
pub mod protocol;
pub mod sequencer;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::{ConfigError, LabwareCatalog, PlaybackConfig, ReplayConfig};
pub use labware::{LabwareState, LabwareStore};
pub use messaging::{create_notification_channel, Notification};
pub use protocol::{Action, Command, LabwareKind, LogParser, WellCoord, parse_log};
pub use sequencer::{SimulationSession, StepperState, TickOutcome};
