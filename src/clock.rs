//! Monotonic time source used by the pacer and mode loops.

use std::time::{Duration, Instant};

pub trait Clock {
    /// Current monotonic time
    fn now(&self) -> Instant;

    /// Seconds from `earlier` to `later`, zero if `later` precedes `earlier`
    fn seconds_between(&self, earlier: Instant, later: Instant) -> f64 {
        later.saturating_duration_since(earlier).as_secs_f64()
    }

    /// Block the calling thread for roughly `duration`
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::time::Instant`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
pub use manual::ManualClock;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_between_saturates() {
        let clock = ManualClock::new();
        let a = clock.now();
        clock.advance(Duration::from_millis(250));
        let b = clock.now();
        assert!((clock.seconds_between(a, b) - 0.25).abs() < 1e-9);
        assert_eq!(clock.seconds_between(b, a), 0.0);
    }

    #[test]
    fn test_manual_clock_steps_per_read() {
        let clock = ManualClock::with_step(Duration::from_millis(10));
        let start = clock.peek();
        clock.now();
        clock.now();
        assert_eq!(clock.peek() - start, Duration::from_millis(20));
        assert_eq!(clock.reads(), 2);
    }

    #[test]
    fn test_manual_clock_sleep_advances() {
        let clock = ManualClock::new();
        let start = clock.peek();
        clock.sleep(Duration::from_secs(3));
        assert_eq!(clock.peek() - start, Duration::from_secs(3));
    }
}
