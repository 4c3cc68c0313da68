// Log parser - turns instrument run logs into an ordered command list
//
// Each line is tested against an ordered rule list, first match wins.
// Lines that match nothing are dropped without a diagnostic. Numbers are
// ASCII digits only; other Unicode digits never match.

use super::command::{Action, Command, Slot};
use super::well::{WellCoord, column_index};
use crate::config::LabwareCatalog;
use regex::{Captures, Regex};
use tracing::{debug, warn};

type Constructor = fn(&Captures) -> Option<Command>;

/// One (pattern, constructor) pair
struct ParseRule {
    name: &'static str,
    pattern: Regex,
    build: Constructor,
}

/// Result of parsing a whole log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    /// Commands in input line order
    pub commands: Vec<Command>,
    /// Non-blank lines no rule recognized
    pub skipped_lines: usize,
}

/// Ordered rule set built from a labware catalog
pub struct LogParser {
    rules: Vec<ParseRule>,
}

impl LogParser {
    /// Build the five rules, in priority order, for the given product names
    pub fn new(catalog: &LabwareCatalog) -> Self {
        let reservoir = regex::escape(&catalog.reservoir_name);
        let plate = regex::escape(&catalog.well_plate_name);
        let tip_rack = regex::escape(&catalog.tip_rack_name);

        let sources: [(&'static str, String, Constructor); 5] = [
            (
                "reservoir aspirate",
                format!(r"Aspirating ([0-9]+\.[0-9]+) uL from A([0-9]+) of {reservoir}.*on slot ([0-9]+)"),
                |caps| reservoir_command(caps, Action::Aspirate),
            ),
            (
                "well plate aspirate",
                format!(r"Aspirating ([0-9]+\.[0-9]+) uL from ([A-H][0-9]+) of {plate}.*on slot ([0-9]+)"),
                |caps| plate_command(caps, Action::Aspirate),
            ),
            (
                "reservoir dispense",
                format!(r"Dispensing ([0-9]+\.[0-9]+) uL from A([0-9]+) of {reservoir}.*on slot ([0-9]+)"),
                |caps| reservoir_command(caps, Action::Dispense),
            ),
            (
                "well plate dispense",
                format!(r"Dispensing ([0-9]+\.[0-9]+) uL into ([A-H][0-9]+) of {plate}.*on slot ([0-9]+)"),
                |caps| plate_command(caps, Action::Dispense),
            ),
            (
                "tip pickup",
                format!(r"Picking up tip from ([A-H][0-9]+) of {tip_rack}.* on slot ([0-9]+)"),
                tip_command,
            ),
        ];

        let mut rules = Vec::with_capacity(sources.len());
        for (name, source, build) in sources {
            match Regex::new(&source) {
                Ok(pattern) => rules.push(ParseRule {
                    name,
                    pattern,
                    build,
                }),
                // Only reachable with absurdly long product names
                Err(e) => warn!(rule = name, error = %e, "Parse rule disabled"),
            }
        }

        Self { rules }
    }

    /// Parse a single line, `None` if no rule applies
    pub fn parse_line(&self, line: &str) -> Option<Command> {
        for rule in &self.rules {
            if let Some(caps) = rule.pattern.captures(line) {
                let command = (rule.build)(&caps);
                if command.is_none() {
                    debug!(rule = rule.name, line, "Matched line has unusable values");
                }
                return command;
            }
        }
        None
    }

    /// Parse a multi-line log, preserving line order
    pub fn parse(&self, text: &str) -> ParsedLog {
        let mut parsed = ParsedLog::default();

        for line in text.trim().lines() {
            match self.parse_line(line) {
                Some(command) => parsed.commands.push(command),
                None if !line.trim().is_empty() => parsed.skipped_lines += 1,
                None => {}
            }
        }

        debug!(
            commands = parsed.commands.len(),
            skipped = parsed.skipped_lines,
            "Parsed log"
        );
        parsed
    }
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new(&LabwareCatalog::default())
    }
}

/// Parse with the stock labware catalog
pub fn parse_log(text: &str) -> Vec<Command> {
    LogParser::default().parse(text).commands
}

fn volume(caps: &Captures, group: usize) -> Option<f64> {
    caps.get(group)?.as_str().parse().ok()
}

fn slot(caps: &Captures, group: usize) -> Option<Slot> {
    // Digits only, so the one failure left is overflow
    Some(caps.get(group)?.as_str().parse().unwrap_or(Slot::MAX))
}

fn reservoir_command(caps: &Captures, action: Action) -> Option<Command> {
    let volume = volume(caps, 1)?;
    let column = column_index(caps.get(2)?.as_str())?;
    let slot = slot(caps, 3)?;
    Some(Command::reservoir(action, slot, column, volume))
}

fn plate_command(caps: &Captures, action: Action) -> Option<Command> {
    let volume = volume(caps, 1)?;
    let well = WellCoord::from_label(caps.get(2)?.as_str())?;
    let slot = slot(caps, 3)?;
    Some(Command::well_plate(action, slot, well, volume))
}

fn tip_command(caps: &Captures) -> Option<Command> {
    let well = WellCoord::from_label(caps.get(1)?.as_str())?;
    let slot = slot(caps, 2)?;
    Some(Command::pickup_tip(slot, well))
}
