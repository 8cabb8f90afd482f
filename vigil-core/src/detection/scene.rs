//! Scene cut rate detection.
//!
//! A frame is a cut when its `lavfi.scene_score` reaches the cut threshold.
//! Cuts go through the same sliding window as flashes; windows holding at
//! least `max_cuts_per_window` cuts become rapid-cut findings.

use super::stats::{self, IntervalStats, Period};
use super::{Finding, TimeWindow, ViolationKind};
use crate::config::SceneConfig;
use crate::signal::MetadataFrame;
use crate::signal::samples::KEY_SCENE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneAnalysis {
    /// Frames that carried a scene score.
    pub scored_frames: usize,
    pub cut_times: Vec<f64>,
    pub max_rate: u32,
    /// Average cuts per minute over the whole duration.
    pub cuts_per_minute: f64,
    pub rapid_periods: Vec<Period>,
    pub interval_stats: Option<IntervalStats>,
}

impl SceneAnalysis {
    pub fn findings(&self, duration: f64, config: &SceneConfig) -> Vec<Finding> {
        self.rapid_periods
            .iter()
            .map(|p| {
                Finding::new(
                    ViolationKind::RapidCuts,
                    TimeWindow::clamped(p.start, p.end, duration),
                    p.peak as f64,
                    format!(
                        "{} cuts within {:.1}s between {:.2}s and {:.2}s",
                        p.peak, config.window_secs, p.start, p.end
                    ),
                )
            })
            .collect()
    }
}

pub fn detect_cuts(frames: &[MetadataFrame], duration: f64, config: &SceneConfig) -> SceneAnalysis {
    let mut analysis = SceneAnalysis::default();
    if !(duration > 0.0) {
        analysis.scored_frames = frames.iter().filter(|f| f.get(KEY_SCENE).is_some()).count();
        return analysis;
    }

    for frame in frames {
        let Some(score) = frame.get(KEY_SCENE) else {
            continue;
        };
        analysis.scored_frames += 1;
        // The first frame always scores against nothing.
        if frame.frame_index > 0
            && score >= config.cut_threshold
            && (0.0..=duration).contains(&frame.pts_time)
        {
            analysis.cut_times.push(frame.pts_time);
        }
    }

    let times = &analysis.cut_times;
    analysis.max_rate = stats::max_rate(times, config.window_secs);
    analysis.cuts_per_minute = times.len() as f64 * 60.0 / duration;
    analysis.rapid_periods =
        stats::critical_periods(times, config.window_secs, config.max_cuts_per_window, duration);
    analysis.interval_stats = stats::interval_stats(times);

    log::debug!(
        "Scene detection: {} cuts over {} scored frames, max rate {}",
        analysis.cut_times.len(),
        analysis.scored_frames,
        analysis.max_rate
    );
    analysis
}
