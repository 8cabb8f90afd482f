//! Severity buckets.
//!
//! Rate-based findings are bucketed by events per second with the fixed
//! breakpoints `0 | <2 | <3 | <6 | >=6`. Other findings map their magnitude
//! onto the same scale so every violation carries a comparable severity.

use crate::detection::{Finding, ViolationKind};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Safe,
    Low,
    Medium,
    High,
    Extreme,
}

impl Severity {
    /// Bucket for an event rate in events per second.
    pub fn from_rate(rate: f64) -> Self {
        if !(rate > 0.0) {
            Severity::Safe
        } else if rate < 2.0 {
            Severity::Low
        } else if rate < 3.0 {
            Severity::Medium
        } else if rate < 6.0 {
            Severity::High
        } else {
            Severity::Extreme
        }
    }

    /// Base risk score of the bucket.
    pub fn base_risk(self) -> f64 {
        match self {
            Severity::Safe => 0.0,
            Severity::Low => 20.0,
            Severity::Medium => 45.0,
            Severity::High => 75.0,
            Severity::Extreme => 95.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Safe => "safe",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn from_loudness_excess(lu: f64) -> Severity {
    if lu <= 1.0 {
        Severity::Low
    } else if lu <= 3.0 {
        Severity::Medium
    } else if lu <= 6.0 {
        Severity::High
    } else {
        Severity::Extreme
    }
}

fn from_black_ratio(ratio: f64) -> Severity {
    if ratio <= 2.0 {
        Severity::Low
    } else if ratio <= 5.0 {
        Severity::Medium
    } else {
        Severity::High
    }
}

/// Severity of a single finding.
///
/// `window_secs` converts windowed counts into a per-second rate and
/// `max_black_secs` is the black segment limit the finding was measured against.
pub fn classify(finding: &Finding, window_secs: f64, max_black_secs: f64) -> Severity {
    match finding.kind {
        ViolationKind::Flash | ViolationKind::RedFlash | ViolationKind::RapidCuts => {
            let window = if window_secs > 0.0 { window_secs } else { 1.0 };
            Severity::from_rate(finding.magnitude / window)
        }
        ViolationKind::BlackSegment => {
            let limit = if max_black_secs > 0.0 { max_black_secs } else { 1.0 };
            from_black_ratio(finding.magnitude / limit)
        }
        ViolationKind::LoudnessEbuR128 | ViolationKind::LoudnessAtscA85 => {
            from_loudness_excess(finding.magnitude)
        }
        ViolationKind::AspectRatio | ViolationKind::Format => Severity::Medium,
    }
}
