// Tick scheduler - a single cancellable pending tick with a generation token
//
// Every scheduled tick gets its own handle, and a handle fires at most once:
// `claim` only succeeds for the tick that is pending right now.
//
// Time is passed in by the caller, so the scheduler works the same under a
// UI frame loop, a sleeping CLI loop, or a test with a virtual clock.

use std::time::{Duration, Instant};

/// Token for one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle {
    generation: u64,
    seq: u64,
    due: Instant,
}

impl TickHandle {
    pub fn due(&self) -> Instant {
        self.due
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Holds at most one pending tick
#[derive(Debug, Clone)]
pub struct TickScheduler {
    interval: Duration,
    generation: u64,
    next_seq: u64,
    pending: Option<TickHandle>,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            next_seq: 0,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the delay used for the next `schedule_after`
    ///
    /// An already pending tick keeps its due time.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Schedule a tick due immediately, replacing any pending one
    pub fn schedule_now(&mut self, now: Instant) -> TickHandle {
        self.schedule_at(now)
    }

    /// Schedule a tick one interval after `now`, replacing any pending one
    pub fn schedule_after(&mut self, now: Instant) -> TickHandle {
        self.schedule_at(now + self.interval)
    }

    fn schedule_at(&mut self, due: Instant) -> TickHandle {
        let handle = TickHandle {
            generation: self.generation,
            seq: self.next_seq,
            due,
        };
        self.next_seq += 1;
        self.pending = Some(handle);
        handle
    }

    /// Drop the pending tick and invalidate every handle issued so far
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Whether `handle` was issued after the last cancel
    pub fn is_current(&self, handle: &TickHandle) -> bool {
        handle.generation == self.generation
    }

    /// The pending tick, if it is due at `now`; it stays pending until claimed
    pub fn due_tick(&self, now: Instant) -> Option<TickHandle> {
        self.pending.filter(|handle| handle.due <= now)
    }

    /// Consume the pending tick if it is exactly `handle`
    ///
    /// Fails for handles from before a cancel, handles already claimed and
    /// handles replaced by a later schedule.
    pub fn claim(&mut self, handle: TickHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Time left before the pending tick fires (zero if overdue)
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|handle| handle.due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_tick_waits_for_interval() {
        let start = Instant::now();
        let mut scheduler = TickScheduler::new(Duration::from_millis(500));

        scheduler.schedule_after(start);
        assert!(scheduler.due_tick(start).is_none());
        assert!(scheduler.due_tick(start + Duration::from_millis(499)).is_none());

        let handle = scheduler.due_tick(start + Duration::from_millis(500)).unwrap();
        assert_eq!(scheduler.pending(), Some(handle));
        assert!(scheduler.claim(handle));
        assert!(scheduler.pending().is_none());
    }

    #[test]
    fn test_cancel_invalidates_old_handles() {
        let start = Instant::now();
        let mut scheduler = TickScheduler::new(Duration::from_millis(100));

        let old = scheduler.schedule_now(start);
        scheduler.cancel();
        assert!(!scheduler.is_current(&old));
        assert!(scheduler.due_tick(start).is_none());
        assert!(!scheduler.claim(old));

        let fresh = scheduler.schedule_now(start);
        assert!(scheduler.is_current(&fresh));
        assert_ne!(old.generation(), fresh.generation());
    }

    #[test]
    fn test_interval_change_not_retroactive() {
        let start = Instant::now();
        let mut scheduler = TickScheduler::new(Duration::from_millis(1000));

        let pending = scheduler.schedule_after(start);
        scheduler.set_interval(Duration::from_millis(200));
        assert_eq!(scheduler.pending(), Some(pending));
        assert_eq!(pending.due(), start + Duration::from_millis(1000));

        let next = scheduler.schedule_after(pending.due());
        assert_eq!(next.due(), start + Duration::from_millis(1200));
    }

    #[test]
    fn test_time_until_due() {
        let start = Instant::now();
        let mut scheduler = TickScheduler::new(Duration::from_millis(300));
        assert_eq!(scheduler.time_until_due(start), None);

        scheduler.schedule_after(start);
        assert_eq!(
            scheduler.time_until_due(start + Duration::from_millis(100)),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            scheduler.time_until_due(start + Duration::from_secs(5)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_handle_fires_once() {
        let start = Instant::now();
        let mut scheduler = TickScheduler::new(Duration::from_millis(100));

        let first = scheduler.schedule_now(start);
        assert!(scheduler.claim(first));
        assert!(!scheduler.claim(first));

        // Rescheduled at the same instant, still a different tick
        let second = scheduler.schedule_now(start);
        assert_ne!(first, second);
        assert!(!scheduler.claim(first));
        assert!(scheduler.claim(second));
    }
}
