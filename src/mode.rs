//! Mode loops: flashing patterns and black intervals.
//!
//! Both loops share the same termination rule: stop when the surface reports
//! a cancel signal (checked once per iteration) or when the mode's wall-clock
//! duration has elapsed (checked once per frame, so a mode can overshoot by
//! up to one frame period).

use std::time::Duration;

use crate::clock::Clock;
use crate::display::{CancelSignal, Color, Surface};
use crate::error::{Error, Result};
use crate::pacer::{frame_duration_for, FramePacer, ModeTimer, PacingStrategy};
use crate::pattern::{self, Pattern};
use crate::report::ReportSink;
use crate::scheduler::ToggleScheduler;

/// Delay between black frames; nothing flashes, so there is no point spinning
pub const BLANK_IDLE: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeOutcome {
    Completed,
    Cancelled(CancelSignal),
}

/// One flashing mode: geometry, which parts flash, how fast and for how long
#[derive(Debug, Clone)]
pub struct FlashMode {
    pub name: String,
    pub frequency_hz: f64,
    pub duration: Duration,
    pub pattern: Pattern,
    pub flash_checkerboard: bool,
    /// One flag per entry in `pattern.dots`
    pub flash_dots: Vec<bool>,
    pub pacing: PacingStrategy,
}

impl FlashMode {
    /// Check everything that would make the loop meaningless
    pub fn validate(&self) -> Result<()> {
        frame_duration_for(self.frequency_hz)?;
        if self.pattern.dots.len() != self.flash_dots.len() {
            return Err(Error::DotCountMismatch {
                dots: self.pattern.dots.len(),
                flags: self.flash_dots.len(),
            });
        }
        Ok(())
    }
}

/// Plain background for a fixed time
#[derive(Debug, Clone)]
pub struct BlankInterval {
    pub duration: Duration,
    pub background: Color,
    pub idle: Duration,
}

impl BlankInterval {
    pub fn black(duration: Duration) -> Self {
        Self {
            duration,
            background: Color::BLACK,
            idle: BLANK_IDLE,
        }
    }
}

/// Run a flashing mode until it expires or is cancelled.
///
/// Invalid configuration is rejected before the first frame.
pub fn run_flash_mode<S, C, R>(
    surface: &mut S,
    clock: &C,
    sink: &mut R,
    mode: &FlashMode,
) -> Result<ModeOutcome>
where
    S: Surface + ?Sized,
    C: Clock + ?Sized,
    R: ReportSink + ?Sized,
{
    mode.validate()?;

    let start = clock.now();
    let mut pacer = FramePacer::new(mode.frequency_hz, start)?.with_strategy(mode.pacing);
    let mut scheduler = ToggleScheduler::for_mode(mode, start)?;

    log::info!(
        "{}: {:.3} Hz for {:.1}s",
        mode.name,
        mode.frequency_hz,
        mode.duration.as_secs_f64()
    );
    log::debug!(
        "{}: frame period {:?}, pacing {:?}",
        mode.name,
        pacer.frame_duration(),
        mode.pacing
    );

    let outcome = loop {
        if let Some(signal) = surface.poll_cancel() {
            break ModeOutcome::Cancelled(signal);
        }

        let now = pacer.wait_for_tick(clock);
        scheduler.on_tick(now, sink);

        pattern::render(surface, &mode.pattern, &scheduler.frame_state())?;

        if pacer.timer().is_expired_at(now, mode.duration) {
            break ModeOutcome::Completed;
        }
    };

    for summary in scheduler.summaries() {
        match summary.mean_frequency_hz {
            Some(hz) => log::info!(
                "{}: {} toggles, {:.3} Hz overall",
                summary.label,
                summary.total_toggles,
                hz
            ),
            None => log::info!("{}: no toggles", summary.label),
        }
    }
    log::info!("{}: {:?} after {} frames", mode.name, outcome, scheduler.ticks());

    Ok(outcome)
}

/// Show a plain background until the interval expires or is cancelled
pub fn run_blank_mode<S, C>(
    surface: &mut S,
    clock: &C,
    blank: &BlankInterval,
) -> Result<ModeOutcome>
where
    S: Surface + ?Sized,
    C: Clock + ?Sized,
{
    let timer = ModeTimer::new(clock.now());
    log::info!("blank: {:.1}s", blank.duration.as_secs_f64());

    loop {
        if let Some(signal) = surface.poll_cancel() {
            return Ok(ModeOutcome::Cancelled(signal));
        }
        if timer.is_expired(clock, blank.duration) {
            return Ok(ModeOutcome::Completed);
        }

        surface.clear(blank.background)?;
        surface.present()?;

        clock.sleep(blank.idle);
    }
}
