//! Frame pacing against a monotonic clock.
//!
//! The pacer turns a target frequency into a per-frame gate. The default
//! strategy spins on the clock without sleeping: timing precision matters
//! more than CPU usage for a calibration pattern.

use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::error::{Error, Result};

/// How `FramePacer::wait_for_tick` burns the time between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacingStrategy {
    /// Poll the clock continuously
    #[default]
    Spin,
    /// Sleep until `margin` before the deadline, then poll
    SleepThenSpin { margin: Duration },
}

impl PacingStrategy {
    pub const DEFAULT_MARGIN: Duration = Duration::from_millis(2);

    pub fn hybrid() -> Self {
        Self::SleepThenSpin {
            margin: Self::DEFAULT_MARGIN,
        }
    }
}

/// Wall-clock budget of a single mode
#[derive(Debug, Clone, Copy)]
pub struct ModeTimer {
    start: Instant,
}

impl ModeTimer {
    pub fn new(start: Instant) -> Self {
        Self { start }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }

    pub fn elapsed_since_start<C: Clock + ?Sized>(&self, clock: &C) -> Duration {
        self.elapsed_at(clock.now())
    }

    pub fn is_expired_at(&self, now: Instant, duration: Duration) -> bool {
        self.elapsed_at(now) >= duration
    }

    pub fn is_expired<C: Clock + ?Sized>(&self, clock: &C, duration: Duration) -> bool {
        self.is_expired_at(clock.now(), duration)
    }
}

/// Busy-wait frame gate for one mode
#[derive(Debug, Clone)]
pub struct FramePacer {
    frame_duration: Duration,
    last_frame: Instant,
    timer: ModeTimer,
    strategy: PacingStrategy,
}

impl FramePacer {
    /// Create a pacer ticking at `frequency_hz`, starting at `start`.
    ///
    /// Zero, negative and non-finite frequencies are rejected, as is any
    /// frequency whose period does not fit in a `Duration`.
    pub fn new(frequency_hz: f64, start: Instant) -> Result<Self> {
        let frame_duration = frame_duration_for(frequency_hz)?;
        Ok(Self {
            frame_duration,
            last_frame: start,
            timer: ModeTimer::new(start),
            strategy: PacingStrategy::Spin,
        })
    }

    pub fn with_strategy(mut self, strategy: PacingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    pub fn last_frame(&self) -> Instant {
        self.last_frame
    }

    pub fn timer(&self) -> &ModeTimer {
        &self.timer
    }

    /// Advance if a full frame has elapsed at `now`
    fn advance_at(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_frame) >= self.frame_duration {
            self.last_frame = now;
            true
        } else {
            false
        }
    }

    /// True (and `last_frame` moves to now) once a full frame has elapsed
    pub fn should_advance<C: Clock + ?Sized>(&mut self, clock: &C) -> bool {
        self.advance_at(clock.now())
    }

    /// Block until the next tick and return the instant it fired at
    pub fn wait_for_tick<C: Clock + ?Sized>(&mut self, clock: &C) -> Instant {
        loop {
            let now = clock.now();
            if self.advance_at(now) {
                return now;
            }

            match self.strategy {
                PacingStrategy::Spin => std::hint::spin_loop(),
                PacingStrategy::SleepThenSpin { margin } => {
                    let elapsed = now.saturating_duration_since(self.last_frame);
                    let remaining = self.frame_duration.saturating_sub(elapsed);
                    if remaining > margin {
                        clock.sleep(remaining - margin);
                    } else {
                        std::hint::spin_loop();
                    }
                },
            }
        }
    }

    pub fn elapsed_since_start<C: Clock + ?Sized>(&self, clock: &C) -> Duration {
        self.timer.elapsed_since_start(clock)
    }

    pub fn is_expired<C: Clock + ?Sized>(&self, clock: &C, duration: Duration) -> bool {
        self.timer.is_expired(clock, duration)
    }
}

/// Period of one frame at `frequency_hz`
pub fn frame_duration_for(frequency_hz: f64) -> Result<Duration> {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return Err(Error::InvalidFrequency(frequency_hz));
    }
    Duration::try_from_secs_f64(1.0 / frequency_hz)
        .map_err(|_| Error::InvalidFrequency(frequency_hz))
}
