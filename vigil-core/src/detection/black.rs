//! Black segment detection.
//!
//! Consecutive frames whose `lavfi.blackframe.pblack` reaches the configured
//! amount form a black segment. A segment ends at the timestamp of the first
//! following non-black frame, or at the end of the media.

use super::{Finding, TimeWindow, ViolationKind};
use crate::config::BlackConfig;
use crate::signal::MetadataFrame;
use serde::{Deserialize, Serialize};

pub const KEY_PBLACK: &str = "blackframe.pblack";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlackAnalysis {
    pub measured_frames: usize,
    pub segments: Vec<TimeWindow>,
    pub total_black_secs: f64,
    pub longest_segment_secs: f64,
}

impl BlackAnalysis {
    pub fn findings(&self, config: &BlackConfig) -> Vec<Finding> {
        self.segments
            .iter()
            .filter(|s| s.length() > config.max_black_secs)
            .map(|s| {
                Finding::new(
                    ViolationKind::BlackSegment,
                    *s,
                    s.length(),
                    format!(
                        "black for {:.2}s from {:.2}s (limit {:.1}s)",
                        s.length(),
                        s.start,
                        config.max_black_secs
                    ),
                )
            })
            .collect()
    }
}

pub fn detect_black(frames: &[MetadataFrame], duration: f64, config: &BlackConfig) -> BlackAnalysis {
    let mut analysis = BlackAnalysis::default();
    if !(duration > 0.0) {
        return analysis;
    }

    let mut open: Option<f64> = None;
    for frame in frames {
        let Some(pblack) = frame.get(KEY_PBLACK) else {
            continue;
        };
        analysis.measured_frames += 1;
        let black = pblack >= config.black_amount_pct;
        match (open, black) {
            (None, true) => open = Some(frame.pts_time),
            (Some(start), false) => {
                analysis
                    .segments
                    .push(TimeWindow::clamped(start, frame.pts_time, duration));
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        analysis
            .segments
            .push(TimeWindow::clamped(start, duration, duration));
    }

    analysis.total_black_secs = analysis.segments.iter().map(TimeWindow::length).sum();
    analysis.longest_segment_secs = analysis
        .segments
        .iter()
        .map(TimeWindow::length)
        .fold(0.0, f64::max);
    analysis
}
