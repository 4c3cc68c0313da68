// Simulation session - owns the parsed log, labware state and playback clock
//
// Controls talk to the session through `run`, `rewind` and `set_interval`.
// The host loop calls `poll` with the current time; the session applies at
// most one command per due tick and schedules the next one itself.

use super::scheduler::{TickHandle, TickScheduler};
use super::stepper::{StepReport, Stepper, StepperState};
use crate::config::ReplayConfig;
use crate::labware::store::LabwareStore;
use crate::messaging::channels::NotificationProducer;
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::protocol::command::Command;
use crate::protocol::parser::LogParser;
use ringbuf::traits::Producer;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of firing a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Handle predates the last run or rewind
    Stale,
    /// A command was applied
    Stepped(StepReport),
    /// Nothing left to apply
    Finished,
}

pub struct SimulationSession {
    config: ReplayConfig,
    parser: LogParser,
    source: String,
    skipped_lines: usize,
    store: LabwareStore,
    stepper: Stepper,
    scheduler: TickScheduler,
    visible: bool,
    notifications: Option<NotificationProducer>,
}

impl SimulationSession {
    /// Build a session; an invalid config is replaced by the defaults
    pub fn new(config: ReplayConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(error = %e, "Invalid replay config, using defaults");
                ReplayConfig::default()
            }
        };

        Self {
            parser: LogParser::new(&config.catalog),
            store: LabwareStore::new(config.catalog.reservoir_capacity),
            scheduler: TickScheduler::new(config.playback.interval()),
            source: String::new(),
            skipped_lines: 0,
            stepper: Stepper::new(),
            visible: false,
            notifications: None,
            config,
        }
    }

    /// Forward user-facing events to a notification channel
    pub fn with_notifications(mut self, producer: NotificationProducer) -> Self {
        self.notifications = Some(producer);
        self
    }

    /// Parse `text` and start playback from its first command
    ///
    /// Any tick still pending from a previous run is invalidated. State for
    /// slots touched by an earlier run is kept; only `rewind` discards it.
    /// The first command is due at `now`, so nothing is applied until the
    /// next `poll`.
    pub fn run(&mut self, text: &str, now: Instant) -> StepperState {
        self.scheduler.cancel();
        self.source = text.to_string();

        let parsed = self.parser.parse(text);
        self.skipped_lines = parsed.skipped_lines;
        let count = parsed.commands.len();

        let state = self.stepper.start(parsed.commands, &mut self.store);
        self.visible = count > 0;

        if state.is_running() {
            self.scheduler.schedule_now(now);
        }

        info!(
            commands = count,
            skipped = self.skipped_lines,
            slots = self.store.len(),
            "Replay started"
        );
        self.notify(if count > 0 {
            Notification::info(
                NotificationCategory::Parser,
                format!(
                    "Loaded {} steps ({} lines ignored)",
                    count, self.skipped_lines
                ),
            )
        } else {
            Notification::warning(
                NotificationCategory::Parser,
                "No recognized commands in log".to_string(),
            )
        });

        state
    }

    /// Discard all labware state and replay the last log from the start
    pub fn rewind(&mut self, now: Instant) -> StepperState {
        self.scheduler.cancel();
        self.store.clear();
        self.stepper.reset();
        self.visible = false;

        info!("Replay rewound");
        let source = std::mem::take(&mut self.source);
        self.run(&source, now)
    }

    /// Change the playback delay; applies from the next scheduled tick on
    pub fn set_interval(&mut self, ms: u64) {
        let interval = self.config.playback.clamp_interval(ms);
        debug!(interval_ms = interval.as_millis() as u64, "Playback interval changed");
        self.scheduler.set_interval(interval);
    }

    pub fn interval(&self) -> Duration {
        self.scheduler.interval()
    }

    /// Fire the pending tick if it is due
    pub fn poll(&mut self, now: Instant) -> Option<TickOutcome> {
        let handle = self.scheduler.due_tick(now)?;
        Some(self.tick(handle, now))
    }

    /// Apply one command for `handle` and schedule its successor
    ///
    /// Only the currently pending tick is honoured, and only once.
    pub fn tick(&mut self, handle: TickHandle, now: Instant) -> TickOutcome {
        if !self.scheduler.claim(handle) {
            debug!(
                generation = handle.generation(),
                current = self.scheduler.is_current(&handle),
                "Dropping stale tick"
            );
            return TickOutcome::Stale;
        }

        let Some(report) = self.stepper.step(&mut self.store) else {
            return TickOutcome::Finished;
        };
        debug!(
            step = report.index,
            outcome = ?report.outcome,
            "{}",
            report.command
        );

        if self.stepper.state().is_running() {
            self.scheduler.schedule_after(now);
        } else {
            self.finish();
        }

        TickOutcome::Stepped(report)
    }

    /// Apply every remaining command immediately
    ///
    /// Returns the number of commands applied.
    pub fn run_to_end(&mut self) -> usize {
        self.scheduler.cancel();
        let mut applied = 0;
        while self.stepper.step(&mut self.store).is_some() {
            applied += 1;
        }
        if applied > 0 {
            self.finish();
        }
        applied
    }

    /// How long the host loop may sleep before the next tick
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_due(now)
    }

    fn finish(&mut self) {
        info!(steps = self.stepper.len(), "Replay finished");
        self.notify(Notification::info(
            NotificationCategory::Playback,
            format!("Playback finished after {} steps", self.stepper.len()),
        ));
    }

    fn notify(&mut self, notification: Notification) {
        if let Some(producer) = self.notifications.as_mut() {
            // Full channel means the UI is behind; dropping is fine
            let _ = producer.try_push(notification);
        }
    }

    pub fn store(&self) -> &LabwareStore {
        &self.store
    }

    pub fn commands(&self) -> &[Command] {
        self.stepper.commands()
    }

    pub fn state(&self) -> StepperState {
        self.stepper.state()
    }

    pub fn cursor(&self) -> usize {
        self.stepper.cursor()
    }

    /// (applied, total)
    pub fn progress(&self) -> (usize, usize) {
        (self.stepper.cursor(), self.stepper.len())
    }

    /// Labware is shown once a run produced at least one command
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }
}

impl Default for SimulationSession {
    fn default() -> Self {
        Self::new(ReplayConfig::default())
    }
}
