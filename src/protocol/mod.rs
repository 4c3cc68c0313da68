// Protocol - instrument log lines and the commands they describe

pub mod command;
pub mod parser;
pub mod well;

pub use command::{Action, Command, LabwareKind, Location, Slot};
pub use parser::{LogParser, ParsedLog, parse_log};
pub use well::WellCoord;
