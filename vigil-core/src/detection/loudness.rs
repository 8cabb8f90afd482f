//! Programme loudness measurement.
//!
//! The `ebur128` filter tags every audio frame with running values. The last
//! integrated (`r128.I`) and loudness range (`r128.LRA`) values describe the
//! whole programme; momentary and short-term maxima are tracked as they go.

use super::{Finding, TimeWindow, ViolationKind};
use crate::config::LoudnessConfig;
use crate::signal::MetadataFrame;
use serde::{Deserialize, Serialize};

pub const KEY_INTEGRATED: &str = "r128.I";
pub const KEY_RANGE: &str = "r128.LRA";
pub const KEY_MOMENTARY: &str = "r128.M";
pub const KEY_SHORT_TERM: &str = "r128.S";

/// Prefixes read from loudness output.
pub const LOUDNESS_KEYS: &[&str] = &["r128."];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoudnessMeasurement {
    pub integrated_lufs: f64,
    pub loudness_range_lu: Option<f64>,
    pub max_momentary_lufs: Option<f64>,
    pub max_short_term_lufs: Option<f64>,
}

fn fold_max(acc: Option<f64>, value: Option<f64>) -> Option<f64> {
    match (acc, value) {
        (Some(a), Some(v)) => Some(a.max(v)),
        (None, v) => v,
        (a, None) => a,
    }
}

/// `None` when no frame carried an integrated loudness value.
pub fn measure_loudness(frames: &[MetadataFrame]) -> Option<LoudnessMeasurement> {
    let mut integrated = None;
    let mut range = None;
    let mut momentary = None;
    let mut short_term = None;

    for frame in frames {
        integrated = frame.get(KEY_INTEGRATED).or(integrated);
        range = frame.get(KEY_RANGE).or(range);
        momentary = fold_max(momentary, frame.get(KEY_MOMENTARY));
        short_term = fold_max(short_term, frame.get(KEY_SHORT_TERM));
    }

    integrated.map(|integrated_lufs| LoudnessMeasurement {
        integrated_lufs,
        loudness_range_lu: range,
        max_momentary_lufs: momentary,
        max_short_term_lufs: short_term,
    })
}

/// LU outside the tolerance band around `target`, zero when inside.
pub fn excess_lu(measured: f64, target: f64, tolerance: f64) -> f64 {
    ((measured - target).abs() - tolerance).max(0.0)
}

impl LoudnessMeasurement {
    /// One finding per loudness recommendation the programme misses.
    pub fn findings(&self, duration: f64, config: &LoudnessConfig) -> Vec<Finding> {
        let checks = [
            (
                ViolationKind::LoudnessEbuR128,
                "EBU R128",
                "LUFS",
                config.ebu_target_lufs,
                config.ebu_tolerance_lu,
            ),
            (
                ViolationKind::LoudnessAtscA85,
                "ATSC A/85",
                "LKFS",
                config.atsc_target_lkfs,
                config.atsc_tolerance_lu,
            ),
        ];

        checks
            .into_iter()
            .filter_map(|(kind, standard, unit, target, tolerance)| {
                let excess = excess_lu(self.integrated_lufs, target, tolerance);
                (excess > 0.0).then(|| {
                    Finding::new(
                        kind,
                        TimeWindow::whole(duration),
                        excess,
                        format!(
                            "integrated loudness {:.1} {} is {:.1} LU outside {} target {:.1} ±{:.1}",
                            self.integrated_lufs, unit, excess, standard, target, tolerance
                        ),
                    )
                })
            })
            .collect()
    }
}
