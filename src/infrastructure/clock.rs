//! Clock adapters for time operations.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::domain::ports::Clock;

/// System clock backed by `Instant::now()` / `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Controllable clock for tests.
///
/// Both the monotonic and wall-clock views advance together, so TTL
/// expiry and calendar-window rollover can be exercised without
/// sleeping. Clones share the same underlying offset: advancing one
/// clone advances all of them.
#[derive(Debug, Clone)]
pub struct MockClock {
    start_instant: Instant,
    start_utc: DateTime<Utc>,
    offset: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a mock clock whose wall-clock time starts at `start_utc`.
    pub fn new(start_utc: DateTime<Utc>) -> Self {
        Self {
            start_instant: Instant::now(),
            start_utc,
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut offset = self
            .offset
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *offset += duration;
    }

    fn offset(&self) -> Duration {
        *self
            .offset
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start_instant + self.offset()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.start_utc
            + ChronoDuration::from_std(self.offset()).unwrap_or_else(|_| ChronoDuration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = clock.now();
        assert!(t2 > t1);
    }

    #[test]
    fn test_mock_clock_views_advance_together() {
        let start = Utc::now();
        let clock = MockClock::new(start);
        let instant_start = clock.now();

        clock.advance(Duration::from_secs(90));

        assert_eq!(clock.now(), instant_start + Duration::from_secs(90));
        assert_eq!(clock.now_utc(), start + ChronoDuration::seconds(90));
    }

    #[test]
    fn test_mock_clock_clones_share_time() {
        let clock = MockClock::new(Utc::now());
        let clone = clock.clone();

        clone.advance(Duration::from_secs(5));
        assert_eq!(clock.now(), clone.now());
    }
}
