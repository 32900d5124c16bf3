//! Wall-clock access.
//!
//! Every component reads time through [`Clock`] so that hour-of-day rules,
//! streak days and midnight crossings can be exercised deterministically.
//! Timestamps carry their UTC offset: achievement rules care about the
//! user's local hour and local calendar date.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, FixedOffset, Local};

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Shared handle handed to each component.
pub type SharedClock = Rc<dyn Clock>;

/// Reads the operating system clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the engines.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<FixedOffset>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Parse an RFC 3339 instant, e.g. `2024-03-01T09:00:00+02:00`.
    ///
    /// # Panics
    /// Panics on malformed input; intended for test fixtures.
    pub fn at(rfc3339: &str) -> Self {
        let start = DateTime::parse_from_rfc3339(rfc3339)
            .unwrap_or_else(|e| panic!("invalid fixture timestamp {rfc3339:?}: {e}"));
        Self::new(start)
    }

    pub fn set(&self, instant: DateTime<FixedOffset>) {
        self.now.set(instant);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }

    pub fn shared(&self) -> SharedClock {
        Rc::new(self.clone())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn clones_share_the_same_instant() {
        let clock = ManualClock::at("2024-03-01T23:59:30+00:00");
        let handle = clock.shared();
        clock.advance_secs(45);
        assert_eq!(handle.now().hour(), 0);
        assert_eq!(handle.now(), clock.now());
    }

    #[test]
    fn system_clock_is_close_to_utc_now() {
        let drift = SystemClock.now().timestamp() - chrono::Utc::now().timestamp();
        assert!(drift.abs() <= 1);
    }
}
