//! Event detection module
//!
//! Detectors turn ordered frame data into discrete events and findings. A
//! finding is a threshold breach scoped to a time window; the scoring module
//! later attaches a severity, a risk score and the standards it affects.
//!
//! Frame-based detectors (`flash`, `scene`, `black`, `loudness`) share the
//! sliding-window machinery in `stats`. `format` checks the stream descriptor
//! directly and needs no frame data.

pub mod black;
pub mod flash;
pub mod format;
pub mod loudness;
pub mod scene;
pub mod stats;

pub use flash::{FlashAnalysis, FlashEvent, FlashParams, detect_flashes};
pub use stats::{IntervalStats, Period};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of threshold breach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Flash,
    RedFlash,
    RapidCuts,
    BlackSegment,
    LoudnessEbuR128,
    LoudnessAtscA85,
    AspectRatio,
    Format,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::Flash => "flash",
            ViolationKind::RedFlash => "red_flash",
            ViolationKind::RapidCuts => "rapid_cuts",
            ViolationKind::BlackSegment => "black_segment",
            ViolationKind::LoudnessEbuR128 => "loudness_ebu_r128",
            ViolationKind::LoudnessAtscA85 => "loudness_atsc_a85",
            ViolationKind::AspectRatio => "aspect_ratio",
            ViolationKind::Format => "format",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed time range in seconds, always within `[0, duration]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    /// Builds a window clamped to `[0, duration]`.
    pub fn clamped(start: f64, end: f64, duration: f64) -> Self {
        let duration = duration.max(0.0);
        let start = start.clamp(0.0, duration);
        let end = end.clamp(start, duration);
        Self { start, end }
    }

    pub fn whole(duration: f64) -> Self {
        Self::clamped(0.0, duration, duration)
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// A threshold breach found by a detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: ViolationKind,
    pub window: TimeWindow,
    /// Kind-specific magnitude: events per window for rate findings,
    /// seconds for black segments, LU beyond tolerance for loudness,
    /// relative deviation for descriptor checks.
    pub magnitude: f64,
    pub detail: String,
}

impl Finding {
    pub fn new(kind: ViolationKind, window: TimeWindow, magnitude: f64, detail: impl Into<String>) -> Self {
        Self {
            kind,
            window,
            magnitude,
            detail: detail.into(),
        }
    }
}
