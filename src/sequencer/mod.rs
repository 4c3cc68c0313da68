// Sequencer - replays a parsed log one command per tick

pub mod scheduler;
pub mod session;
pub mod stepper;

pub use scheduler::{TickHandle, TickScheduler};
pub use session::{SimulationSession, TickOutcome};
pub use stepper::{StepReport, Stepper, StepperState};
