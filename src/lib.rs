//! Timed flashing test patterns for photosensor and display-latency rigs.
//!
//! A mode drives one or more flash channels from a shared busy-wait pacer,
//! measures the toggle frequency each channel actually achieved, and reports
//! it about once a second. Drawing goes through the [`display::Surface`]
//! trait and time through [`clock::Clock`], so the timing core runs the same
//! against an SDL window or a simulated clock.

pub mod clock;
pub mod display;
pub mod error;
pub mod logging;
pub mod mode;
pub mod mqtt;
pub mod pacer;
pub mod pattern;
pub mod report;
pub mod scheduler;
pub mod sequence;

pub use error::{Error, Result};
