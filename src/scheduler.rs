//! Toggle-and-measure scheduler.
//!
//! Every flash channel flips once per pacer tick. Channels share the tick but
//! measure independently: each one accumulates the time between its own
//! flips and, about once a second, reports the reciprocal of the mean toggle
//! period. Readings below target are real (clock granularity, load) and are
//! reported as-is.

use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::pattern::FrameState;
use crate::report::{FrequencyReport, ReportSink};

/// Minimum wall time between two reports of the same channel
pub const REPORT_INTERVAL: Duration = Duration::from_secs(1);

pub const CHECKERBOARD_LABEL: &str = "Checkerboard";

/// One independently toggled visual signal
#[derive(Debug, Clone)]
pub struct FlashChannel {
    label: String,
    enabled: bool,
    visible: bool,
    last_toggle: Instant,
    toggle_count: u32,
    accumulated: Duration,
    last_report: Instant,
    min_period: Option<Duration>,
    max_period: Duration,
    total_toggles: u64,
    total_duration: Duration,
}

impl FlashChannel {
    /// Enabled channels start hidden; disabled ones are shown for good.
    pub fn new(label: impl Into<String>, enabled: bool, start: Instant) -> Self {
        Self {
            label: label.into(),
            enabled,
            visible: !enabled,
            last_toggle: start,
            toggle_count: 0,
            accumulated: Duration::ZERO,
            last_report: start,
            min_period: None,
            max_period: Duration::ZERO,
            total_toggles: 0,
            total_duration: Duration::ZERO,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Toggles in the current reporting window
    pub fn toggle_count(&self) -> u32 {
        self.toggle_count
    }

    /// Summed toggle periods in the current reporting window
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    pub fn total_toggles(&self) -> u64 {
        self.total_toggles
    }

    /// Flip the channel at `now`. Returns a report when a window closes.
    ///
    /// Disabled channels ignore the call and stay visible.
    pub fn toggle(&mut self, now: Instant) -> Option<FrequencyReport> {
        if !self.enabled {
            self.visible = true;
            return None;
        }

        self.visible = !self.visible;

        let delta = now.saturating_duration_since(self.last_toggle);
        self.accumulated += delta;
        self.toggle_count += 1;
        self.last_toggle = now;

        self.min_period = Some(self.min_period.map_or(delta, |min| min.min(delta)));
        self.max_period = self.max_period.max(delta);
        self.total_toggles += 1;
        self.total_duration += delta;

        if now.saturating_duration_since(self.last_report) >= REPORT_INTERVAL
            && self.toggle_count > 0
        {
            let mean_period = self.accumulated.as_secs_f64() / f64::from(self.toggle_count);
            let report = FrequencyReport {
                label: self.label.clone(),
                frequency_hz: 1.0 / mean_period,
                toggles: self.toggle_count,
                window: self.accumulated,
                min_period: self.min_period.unwrap_or_default(),
                max_period: self.max_period,
            };

            self.toggle_count = 0;
            self.accumulated = Duration::ZERO;
            self.min_period = None;
            self.max_period = Duration::ZERO;
            self.last_report = now;

            return Some(report);
        }

        None
    }

    /// Whole-mode statistics, `None` for disabled channels
    pub fn summary(&self) -> Option<ChannelSummary> {
        if !self.enabled {
            return None;
        }
        let mean_frequency_hz = (self.total_toggles > 0 && !self.total_duration.is_zero())
            .then(|| self.total_toggles as f64 / self.total_duration.as_secs_f64());
        Some(ChannelSummary {
            label: self.label.clone(),
            total_toggles: self.total_toggles,
            mean_frequency_hz,
        })
    }
}

/// Totals for one channel over a whole mode
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSummary {
    pub label: String,
    pub total_toggles: u64,
    pub mean_frequency_hz: Option<f64>,
}

/// All flash channels of one mode, driven by a single tick source
#[derive(Debug, Clone)]
pub struct ToggleScheduler {
    checkerboard: Option<FlashChannel>,
    dots: Vec<FlashChannel>,
    ticks: u64,
}

impl ToggleScheduler {
    pub fn new(checkerboard: Option<FlashChannel>, dots: Vec<FlashChannel>) -> Self {
        Self {
            checkerboard,
            dots,
            ticks: 0,
        }
    }

    /// Channels for `mode`, all anchored at `start`
    pub fn for_mode(mode: &crate::mode::FlashMode, start: Instant) -> Result<Self> {
        let pattern = &mode.pattern;
        if pattern.dots.len() != mode.flash_dots.len() {
            return Err(Error::DotCountMismatch {
                dots: pattern.dots.len(),
                flags: mode.flash_dots.len(),
            });
        }

        let checkerboard = pattern
            .checkerboard
            .as_ref()
            .map(|_| FlashChannel::new(CHECKERBOARD_LABEL, mode.flash_checkerboard, start));
        let dots = pattern
            .dots
            .iter()
            .zip(&mode.flash_dots)
            .map(|(dot, &enabled)| FlashChannel::new(dot.name, enabled, start))
            .collect();

        Ok(Self::new(checkerboard, dots))
    }

    pub fn channels(&self) -> impl Iterator<Item = &FlashChannel> {
        self.checkerboard.iter().chain(self.dots.iter())
    }

    /// Pacer ticks handled so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Flip every channel once and forward any finished windows to `sink`
    pub fn on_tick<R: ReportSink + ?Sized>(&mut self, now: Instant, sink: &mut R) {
        self.ticks += 1;
        for channel in self.checkerboard.iter_mut().chain(self.dots.iter_mut()) {
            if let Some(report) = channel.toggle(now) {
                sink.report(&report);
            }
        }
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            checkerboard_inverted: self
                .checkerboard
                .as_ref()
                .is_some_and(|c| c.is_enabled() && c.is_visible()),
            dots_visible: self.dots.iter().map(FlashChannel::is_visible).collect(),
        }
    }

    pub fn summaries(&self) -> Vec<ChannelSummary> {
        self.channels().filter_map(FlashChannel::summary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacer::frame_duration_for;

    fn run_exact(
        channel: &mut FlashChannel,
        start: Instant,
        period: Duration,
        ticks: u32,
    ) -> Vec<FrequencyReport> {
        let mut reports = Vec::new();
        for k in 1..=ticks {
            if let Some(report) = channel.toggle(start + period * k) {
                reports.push(report);
            }
        }
        reports
    }

    #[test]
    fn test_exact_period_measures_target() {
        for hz in [1.0, 7.5, 12.0, 15.0, 60.0, 144.0, 240.0] {
            let start = Instant::now();
            let period = frame_duration_for(hz).unwrap();
            let mut channel = FlashChannel::new("dot", true, start);

            // Three seconds of ticks
            let ticks = (hz * 3.0).ceil() as u32;
            let reports = run_exact(&mut channel, start, period, ticks);

            assert!(!reports.is_empty(), "no report at {} Hz", hz);
            for report in &reports {
                assert!(
                    (report.frequency_hz - hz).abs() < hz * 1e-4,
                    "{} Hz measured as {}",
                    hz,
                    report.frequency_hz
                );
            }
        }
    }

    #[test]
    fn test_fifteen_hz_two_seconds() {
        let start = Instant::now();
        let period = frame_duration_for(15.0).unwrap();
        let mut channel = FlashChannel::new("Red Dot", true, start);
        assert_eq!(channel.label(), "Red Dot");
        assert!(channel.is_enabled());

        let reports = run_exact(&mut channel, start, period, 30);
        assert!((1..=2).contains(&reports.len()));
        for report in &reports {
            assert!((report.frequency_hz - 15.0).abs() < 0.01);
            assert_eq!(report.label, "Red Dot");
        }
    }

    #[test]
    fn test_counters_reset_after_report() {
        let start = Instant::now();
        let period = Duration::from_millis(40);
        let mut channel = FlashChannel::new("dot", true, start);

        let mut reports = 0;
        for k in 1..=200 {
            if let Some(report) = channel.toggle(start + period * k) {
                reports += 1;
                assert!(report.toggles > 0);
                assert_eq!(channel.toggle_count(), 0);
                assert_eq!(channel.accumulated(), Duration::ZERO);
            } else {
                assert!(channel.toggle_count() > 0);
            }
        }
        // 200 ticks at 25 Hz is 8 seconds
        assert_eq!(reports, 8);
        assert_eq!(channel.total_toggles(), 200);
    }

    #[test]
    fn test_no_report_before_a_second() {
        let start = Instant::now();
        let mut channel = FlashChannel::new("dot", true, start);
        let reports = run_exact(&mut channel, start, Duration::from_millis(100), 9);
        assert!(reports.is_empty());
        assert_eq!(channel.toggle_count(), 9);
    }

    #[test]
    fn test_enabled_channel_alternates_from_off() {
        let start = Instant::now();
        let mut channel = FlashChannel::new("dot", true, start);
        assert!(!channel.is_visible());

        let mut seen = Vec::new();
        for k in 1..=4 {
            channel.toggle(start + Duration::from_millis(10) * k);
            seen.push(channel.is_visible());
        }
        assert_eq!(seen, vec![true, false, true, false]);
    }

    #[test]
    fn test_disabled_channel_always_visible() {
        let start = Instant::now();
        let mut channel = FlashChannel::new("dot", false, start);
        assert!(channel.is_visible());

        for k in 1..=100 {
            assert!(channel.toggle(start + Duration::from_millis(50) * k).is_none());
            assert!(channel.is_visible());
        }
        assert_eq!(channel.total_toggles(), 0);
        assert!(channel.summary().is_none());
    }

    #[test]
    fn test_slow_ticks_report_low_frequency() {
        // Target 100 Hz, but the host only managed one tick every 25ms
        let start = Instant::now();
        let mut channel = FlashChannel::new("dot", true, start);
        let reports = run_exact(&mut channel, start, Duration::from_millis(25), 40);

        assert_eq!(reports.len(), 1);
        assert!((reports[0].frequency_hz - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_tracks_period_spread() {
        let start = Instant::now();
        let mut channel = FlashChannel::new("dot", true, start);
        let mut now = start;
        let mut report = None;
        for (i, ms) in [60u64, 70].iter().cycle().take(16).enumerate() {
            now += Duration::from_millis(*ms);
            report = channel.toggle(now).or(report);
            if report.is_some() {
                assert_eq!(i, 15);
            }
        }

        let report = report.unwrap();
        assert_eq!(report.toggles, 16);
        assert_eq!(report.min_period, Duration::from_millis(60));
        assert_eq!(report.max_period, Duration::from_millis(70));
        assert!((report.frequency_hz - 1.0 / 0.065).abs() < 1e-9);
    }

    #[test]
    fn test_scheduler_toggles_in_lockstep() {
        let start = Instant::now();
        let mut scheduler = ToggleScheduler::new(
            Some(FlashChannel::new(CHECKERBOARD_LABEL, true, start)),
            vec![
                FlashChannel::new("a", true, start),
                FlashChannel::new("b", false, start),
            ],
        );
        let mut sink: Vec<FrequencyReport> = Vec::new();

        let period = frame_duration_for(15.0).unwrap();
        for k in 1..=16 {
            scheduler.on_tick(start + period * k, &mut sink);
            let state = scheduler.frame_state();
            // Board inverts on exactly the frames the dot is shown
            assert_eq!(state.checkerboard_inverted, state.dots_visible[0]);
            assert!(state.dots_visible[1]);
        }

        let labels: Vec<&str> = sink.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec![CHECKERBOARD_LABEL, "a"]);
        assert_eq!(scheduler.ticks(), 16);

        let summaries = scheduler.summaries();
        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.total_toggles == 16));
    }

    #[test]
    fn test_missing_checkerboard_never_inverts() {
        let scheduler = ToggleScheduler::new(None, vec![]);
        assert_eq!(scheduler.frame_state(), FrameState::all_visible(0));
    }

    #[test]
    fn test_static_checkerboard_never_inverts() {
        let start = Instant::now();
        let board = FlashChannel::new(CHECKERBOARD_LABEL, false, start);
        assert!(!board.is_enabled());
        let mut scheduler =
            ToggleScheduler::new(Some(board), vec![FlashChannel::new("dot", true, start)]);
        let mut sink: Vec<FrequencyReport> = Vec::new();

        let period = frame_duration_for(15.0).unwrap();
        for k in 1..=4 {
            scheduler.on_tick(start + period * k, &mut sink);
            assert!(!scheduler.frame_state().checkerboard_inverted);
        }
    }
}
