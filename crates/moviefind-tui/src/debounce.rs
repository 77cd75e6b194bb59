//! Single-shot debounce timer.

use std::time::Duration;

use tokio::time::Instant;

/// Default quiet period before a query settles.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A pending value and the instant it settles.
#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Holds at most one pending value; every reschedule replaces the value
/// and restarts the quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    /// Quiet period.
    window: Duration,
    /// Value waiting for the quiet period to elapse.
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    /// Creates a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Returns the quiet period.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Schedules `value`, restarting the quiet period from now.
    pub fn schedule(&mut self, value: T) {
        self.schedule_at(value, Instant::now());
    }

    /// Schedules `value`, restarting the quiet period from `now`.
    pub fn schedule_at(&mut self, value: T, now: Instant) {
        let deadline = now.checked_add(self.window).unwrap_or(now);
        self.pending = Some(Pending { value, deadline });
    }

    /// Returns when the pending value settles, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Returns `true` while a value is waiting.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value once its deadline has passed.
    pub fn take_ready(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if p.deadline <= now => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Drops the pending value without settling it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
