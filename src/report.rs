//! Frequency reports and the sinks that receive them.

use std::io::Write;
use std::time::Duration;

use serde::Serialize;

/// Measured toggle frequency of one channel over one reporting window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyReport {
    pub label: String,
    pub frequency_hz: f64,
    /// Toggles averaged into this report
    pub toggles: u32,
    #[serde(serialize_with = "as_secs")]
    pub window: Duration,
    #[serde(serialize_with = "as_secs")]
    pub min_period: Duration,
    #[serde(serialize_with = "as_secs")]
    pub max_period: Duration,
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl FrequencyReport {
    /// Spread between the longest and shortest toggle period in the window
    pub fn jitter(&self) -> Duration {
        self.max_period.saturating_sub(self.min_period)
    }
}

/// Receives frequency reports, at most once per channel per second
pub trait ReportSink {
    fn report(&mut self, report: &FrequencyReport);
}

impl ReportSink for Vec<FrequencyReport> {
    fn report(&mut self, report: &FrequencyReport) {
        self.push(report.clone());
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn report(&mut self, report: &FrequencyReport) {
        (**self).report(report);
    }
}

/// Writes each report through the `log` facade
#[derive(Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&mut self, report: &FrequencyReport) {
        log::info!("{} Frequency: {:.3} Hz", report.label, report.frequency_hz);
        log::debug!(
            "{}: {} toggles over {:.3}s, jitter {:.3}ms",
            report.label,
            report.toggles,
            report.window.as_secs_f64(),
            report.jitter().as_secs_f64() * 1000.0
        );
    }
}

/// One JSON object per line on any writer (stdout by default)
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl JsonLinesSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn report(&mut self, report: &FrequencyReport) {
        let result = serde_json::to_writer(&mut self.writer, report)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"))
            .and_then(|()| self.writer.flush());
        if let Err(e) = result {
            log::warn!("failed to write report for {}: {}", report.label, e);
        }
    }
}

/// Forwards every report to all inner sinks
#[derive(Default)]
pub struct Fanout {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReportSink for Fanout {
    fn report(&mut self, report: &FrequencyReport) {
        for sink in &mut self.sinks {
            sink.report(report);
        }
    }
}
