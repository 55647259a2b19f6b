use std::cell::Cell;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Time source used for rate limiting, cache expiry and queue timestamps.
pub trait Clock {
    /// Monotonic time since an arbitrary origin.
    fn elapsed(&self) -> Duration;
    /// Wall-clock time.
    fn now(&self) -> DateTime<Utc>;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only moves when told to. `sleep` advances it instantly and
/// records the total slept time.
#[derive(Debug)]
pub struct ManualClock {
    start: DateTime<Utc>,
    offset: Cell<Duration>,
    slept: Cell<Duration>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            offset: Cell::new(Duration::ZERO),
            slept: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    /// Total time spent in `sleep`.
    pub fn slept(&self) -> Duration {
        self.slept.get()
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.offset.get()
    }

    fn now(&self) -> DateTime<Utc> {
        let offset = chrono::TimeDelta::from_std(self.offset.get()).unwrap_or_default();
        self.start + offset
    }

    fn sleep(&self, duration: Duration) {
        self.slept.set(self.slept.get() + duration);
        self.advance(duration);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn elapsed(&self) -> Duration {
        (**self).elapsed()
    }

    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_moves_on_advance_and_sleep() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(Duration::from_millis(400));
        clock.sleep(Duration::from_millis(600));
        assert_eq!(clock.elapsed(), Duration::from_secs(1));
        assert_eq!(clock.slept(), Duration::from_millis(600));
        assert_eq!(clock.now(), start + chrono::TimeDelta::seconds(1));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(b >= a);
    }
}
