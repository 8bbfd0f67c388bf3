//! Ordered list of modes to run, and the standard calibration run.

use std::time::Duration;

use crate::clock::Clock;
use crate::display::{CancelSignal, Surface};
use crate::error::Result;
use crate::mode::{run_blank_mode, run_flash_mode, BlankInterval, FlashMode, ModeOutcome};
use crate::pacer::PacingStrategy;
use crate::pattern::Pattern;
use crate::report::ReportSink;

pub const CHECKER_FREQUENCY_HZ: f64 = 15.0;
pub const DOT_FREQUENCY_HZ: f64 = 12.0;

#[derive(Debug, Clone)]
pub enum Step {
    Blank(BlankInterval),
    Flash(FlashMode),
}

impl Step {
    pub fn name(&self) -> &str {
        match self {
            Self::Blank(_) => "blank",
            Self::Flash(mode) => &mode.name,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Self::Blank(blank) => blank.duration,
            Self::Flash(mode) => mode.duration,
        }
    }
}

/// Knobs for `Sequence::standard`
#[derive(Debug, Clone)]
pub struct SequenceOptions {
    pub checker_frequency_hz: f64,
    pub dot_frequency_hz: f64,
    /// Length of each checkerboard mode
    pub checker_duration: Duration,
    /// Length of each white-dot mode
    pub dot_duration: Duration,
    /// Black screen before the first mode
    pub lead_in: Duration,
    /// Black screen after every mode
    pub blank_duration: Duration,
    /// Number of white-dot rounds at the end
    pub dot_rounds: usize,
    pub pacing: PacingStrategy,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            checker_frequency_hz: CHECKER_FREQUENCY_HZ,
            dot_frequency_hz: DOT_FREQUENCY_HZ,
            checker_duration: Duration::from_secs(15),
            dot_duration: Duration::from_secs(15),
            lead_in: Duration::from_secs(15),
            blank_duration: Duration::from_secs(10),
            dot_rounds: 3,
            pacing: PacingStrategy::Spin,
        }
    }
}

/// How a sequence run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequenceSummary {
    pub completed: usize,
    pub skipped: usize,
    pub quit: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// The calibration run: three checkerboard variants, then white-dot
    /// rounds, each surrounded by black intervals.
    pub fn standard(width: u32, height: u32, options: &SequenceOptions) -> Self {
        let checker = |name: &str, flash_checkerboard: bool, flash_dot: bool| {
            Step::Flash(FlashMode {
                name: name.to_string(),
                frequency_hz: options.checker_frequency_hz,
                duration: options.checker_duration,
                pattern: Pattern::checkerboard_with_red_dot(width, height),
                flash_checkerboard,
                flash_dots: vec![flash_dot],
                pacing: options.pacing,
            })
        };
        let blank = || Step::Blank(BlankInterval::black(options.blank_duration));

        let mut steps = vec![
            Step::Blank(BlankInterval::black(options.lead_in)),
            checker("static checkerboard, flashing dot", false, true),
            blank(),
            checker("flashing checkerboard, static dot", true, false),
            blank(),
            checker("flashing checkerboard and dot", true, true),
            blank(),
        ];

        for round in 1..=options.dot_rounds {
            steps.push(Step::Flash(FlashMode {
                name: format!("flashing white dot #{}", round),
                frequency_hz: options.dot_frequency_hz,
                duration: options.dot_duration,
                pattern: Pattern::white_dot_on_black(width, height),
                flash_checkerboard: false,
                flash_dots: vec![true],
                pacing: options.pacing,
            }));
            steps.push(blank());
        }

        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(Step::duration).sum()
    }

    /// Fail on the first misconfigured step, before anything is shown
    pub fn validate(&self) -> Result<()> {
        for step in &self.steps {
            if let Step::Flash(mode) = step {
                mode.validate()?;
            }
        }
        Ok(())
    }

    /// Run every step in order.
    ///
    /// A skip signal ends the current step only; quit ends the run.
    pub fn run<S, C, R>(&self, surface: &mut S, clock: &C, sink: &mut R) -> Result<SequenceSummary>
    where
        S: Surface + ?Sized,
        C: Clock + ?Sized,
        R: ReportSink + ?Sized,
    {
        self.validate()?;

        let mut summary = SequenceSummary::default();
        for (index, step) in self.steps.iter().enumerate() {
            log::debug!("step {}/{}: {}", index + 1, self.steps.len(), step.name());

            let outcome = match step {
                Step::Blank(blank) => run_blank_mode(surface, clock, blank)?,
                Step::Flash(mode) => run_flash_mode(surface, clock, sink, mode)?,
            };

            match outcome {
                ModeOutcome::Completed => summary.completed += 1,
                ModeOutcome::Cancelled(CancelSignal::Skip) => {
                    log::info!("{}: skipped", step.name());
                    summary.skipped += 1;
                },
                ModeOutcome::Cancelled(CancelSignal::Quit) => {
                    log::info!("{}: quit requested", step.name());
                    summary.quit = true;
                    break;
                },
            }
        }

        Ok(summary)
    }
}
