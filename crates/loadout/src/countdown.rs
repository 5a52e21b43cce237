//! Remove-mode countdown.
//!
//! A single deadline owned by whoever drives remove mode. Restarting replaces
//! the deadline, so there is never more than one countdown in flight.

use std::time::{Duration, Instant};

/// How long remove mode stays on without a removal.
pub const REMOVE_MODE_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RemoveCountdown {
    duration: Duration,
    deadline: Option<Instant>,
}

impl Default for RemoveCountdown {
    fn default() -> Self {
        Self::new(REMOVE_MODE_DURATION)
    }
}

impl RemoveCountdown {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Starts (or restarts) the countdown at its full duration.
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.duration);
    }

    /// Same as [`start`](Self::start); reads better at removal sites.
    pub fn restart(&mut self, now: Instant) {
        self.start(now);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Whole seconds left, rounded up: 5, 4, ... 1, then 0 at the deadline.
    pub fn remaining_secs(&self, now: Instant) -> Option<u64> {
        self.remaining(now)
            .map(|left| (left.as_millis() as u64 + 999) / 1000)
    }

    /// True once the deadline has passed. A stopped countdown never expires.
    pub fn expired(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Clears the deadline if it has passed; returns whether it did.
    pub fn take_expired(&mut self, now: Instant) -> bool {
        if self.expired(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}
