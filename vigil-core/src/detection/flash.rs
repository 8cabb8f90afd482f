// ============================================================================
// vigil-core/src/detection/flash.rs
// ============================================================================
//
// FLASH DETECTION: Photosensitive Flash and Red-Flash Events
//
// A flash transition is a pair of adjacent frames whose average luminance
// differs by more than the flash threshold while the darker of the two stays
// strictly below the dark cap. Both limits are percentages of the luminance
// scale (2^bit_depth - 1), so 8-bit content uses 25.5 and 204.
//
// ALGORITHM:
// 1. Emit an event for every qualifying adjacent pair, stamped with the
//    timestamp and index of the later frame.
// 2. Drop events whose timestamp is outside [0, duration].
// 3. Count events in [t, t + window) for every event; the maximum is MaxRate.
// 4. Merge windows whose count reaches the limit into critical periods.
// 5. Characterise inter-event intervals (frequency, spread, regularity).
//
// An event is red when either frame of its pair is saturated red, judged by
// the average of the V (Cr) plane. Red events get their own rate and periods.

use super::stats::{self, IntervalStats, Period};
use super::{Finding, TimeWindow, ViolationKind};
use crate::config::FlashConfig;
use crate::signal::FrameSample;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Detection thresholds in absolute luminance units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashParams {
    pub scale: f64,
    pub flash_threshold: f64,
    pub dark_cap: f64,
    /// Minimum V-plane average of a saturated red frame.
    pub red_chroma_min: f64,
    pub window_secs: f64,
    pub max_per_window: u32,
}

impl FlashParams {
    pub fn from_config(config: &FlashConfig, bit_depth: u32) -> Self {
        let bits = bit_depth.clamp(1, 16);
        let scale = ((1u64 << bits) - 1) as f64;
        Self {
            scale,
            flash_threshold: scale * config.flash_threshold_pct / 100.0,
            dark_cap: scale * config.dark_cap_pct / 100.0,
            red_chroma_min: config.red_chroma_min * scale / 255.0,
            window_secs: config.window_secs,
            max_per_window: config.max_flashes_per_window,
        }
    }
}

/// One detected flash transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashEvent {
    pub timestamp: f64,
    pub frame_index: u64,
    /// Absolute luminance change of the pair.
    pub intensity: f64,
    pub red: bool,
}

/// Result of flash detection over one sample sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlashAnalysis {
    pub events: Vec<FlashEvent>,
    pub max_rate: u32,
    pub red_max_rate: u32,
    pub exceeds_threshold: bool,
    pub red_exceeds_threshold: bool,
    pub critical_periods: Vec<Period>,
    pub red_critical_periods: Vec<Period>,
    pub interval_stats: Option<IntervalStats>,
    /// Adjacent pairs rejected because a sample was not a valid measurement.
    pub rejected_pairs: usize,
    /// Events discarded because they fell outside the media duration.
    pub dropped_events: usize,
}

impl FlashAnalysis {
    pub fn red_event_count(&self) -> usize {
        self.events.iter().filter(|e| e.red).count()
    }

    /// Critical periods as findings, general flashes first.
    pub fn findings(&self, duration: f64, window_secs: f64) -> Vec<Finding> {
        let general = self.critical_periods.iter().map(|p| {
            Finding::new(
                ViolationKind::Flash,
                TimeWindow::clamped(p.start, p.end, duration),
                p.peak as f64,
                format!(
                    "{} flashes within {:.1}s between {:.2}s and {:.2}s",
                    p.peak, window_secs, p.start, p.end
                ),
            )
        });
        let red = self.red_critical_periods.iter().map(|p| {
            Finding::new(
                ViolationKind::RedFlash,
                TimeWindow::clamped(p.start, p.end, duration),
                p.peak as f64,
                format!(
                    "{} saturated red flashes within {:.1}s between {:.2}s and {:.2}s",
                    p.peak, window_secs, p.start, p.end
                ),
            )
        });
        general.chain(red).collect()
    }
}

fn valid(sample: &FrameSample, scale: f64) -> bool {
    let y = sample.luminance_avg;
    y.is_finite() && (0.0..=scale).contains(&y) && sample.timestamp.is_finite()
}

fn is_red(sample: &FrameSample, params: &FlashParams) -> bool {
    sample
        .chroma_v_avg
        .is_some_and(|v| v.is_finite() && v >= params.red_chroma_min)
}

/// Runs flash detection. Deterministic: identical input gives identical output.
pub fn detect_flashes(samples: &[FrameSample], duration: f64, params: &FlashParams) -> FlashAnalysis {
    let mut analysis = FlashAnalysis::default();
    if !(duration > 0.0) || samples.len() < 2 {
        return analysis;
    }

    for pair in samples.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if !valid(prev, params.scale) || !valid(cur, params.scale) || cur.timestamp < prev.timestamp {
            analysis.rejected_pairs += 1;
            continue;
        }

        let delta = (cur.luminance_avg - prev.luminance_avg).abs();
        let darker = prev.luminance_avg.min(cur.luminance_avg);
        if delta <= params.flash_threshold || darker >= params.dark_cap {
            continue;
        }

        if !(0.0..=duration).contains(&cur.timestamp) {
            analysis.dropped_events += 1;
            continue;
        }

        analysis.events.push(FlashEvent {
            timestamp: cur.timestamp,
            frame_index: cur.frame_index,
            intensity: delta,
            red: is_red(prev, params) || is_red(cur, params),
        });
    }

    if analysis.rejected_pairs > 0 {
        warn!("Flash detection rejected {} invalid sample pairs", analysis.rejected_pairs);
    }
    if analysis.dropped_events > 0 {
        warn!(
            "Flash detection dropped {} events outside [0, {:.3}]",
            analysis.dropped_events, duration
        );
    }

    let times: Vec<f64> = analysis.events.iter().map(|e| e.timestamp).collect();
    let red_times: Vec<f64> = analysis
        .events
        .iter()
        .filter(|e| e.red)
        .map(|e| e.timestamp)
        .collect();

    let window = params.window_secs;
    let limit = params.max_per_window;

    analysis.max_rate = stats::max_rate(&times, window);
    analysis.red_max_rate = stats::max_rate(&red_times, window);
    analysis.exceeds_threshold = analysis.max_rate >= limit;
    analysis.red_exceeds_threshold = analysis.red_max_rate >= limit;
    analysis.critical_periods = stats::critical_periods(&times, window, limit, duration);
    analysis.red_critical_periods = stats::critical_periods(&red_times, window, limit, duration);
    analysis.interval_stats = stats::interval_stats(&times);

    debug!(
        "Flash detection: {} events ({} red), max rate {}/{}s, {} critical periods",
        analysis.events.len(),
        red_times.len(),
        analysis.max_rate,
        window,
        analysis.critical_periods.len()
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FlashParams {
        FlashParams::from_config(&FlashConfig::default(), 8)
    }

    fn alternating(frames: usize, fps: f64, low: f64, high: f64) -> Vec<FrameSample> {
        (0..frames)
            .map(|i| {
                let y = if i % 2 == 0 { low } else { high };
                FrameSample::luma(i as u64, i as f64 / fps, y)
            })
            .collect()
    }

    #[test]
    fn test_params_scale_with_bit_depth() {
        let p8 = params();
        assert_eq!(p8.scale, 255.0);
        assert_eq!(p8.dark_cap, 204.0);
        assert_eq!(p8.flash_threshold, 25.5);

        let p10 = FlashParams::from_config(&FlashConfig::default(), 10);
        assert_eq!(p10.scale, 1023.0);
        assert!((p10.dark_cap - 818.4).abs() < 1e-9);
    }

    #[test]
    fn test_alternating_flashes_exceed_limit() {
        let samples = alternating(21, 10.0, 40.0, 220.0);
        let analysis = detect_flashes(&samples, 2.0, &params());

        assert_eq!(analysis.events.len(), 20);
        assert!(analysis.max_rate >= 3);
        assert!(analysis.exceeds_threshold);
        assert_eq!(analysis.critical_periods.len(), 1);
        let stats = analysis.interval_stats.unwrap();
        assert!((stats.dominant_frequency - 10.0).abs() < 1e-6);
        assert!(stats.regularity > 0.99);
    }

    #[test]
    fn test_dark_cap_is_strict() {
        let at_cap = vec![FrameSample::luma(0, 0.0, 204.0), FrameSample::luma(1, 0.1, 250.0)];
        assert!(detect_flashes(&at_cap, 1.0, &params()).events.is_empty());

        let below = vec![FrameSample::luma(0, 0.0, 203.0), FrameSample::luma(1, 0.1, 250.0)];
        assert_eq!(detect_flashes(&below, 1.0, &params()).events.len(), 1);
    }

    #[test]
    fn test_threshold_is_strict() {
        let exact = vec![FrameSample::luma(0, 0.0, 100.0), FrameSample::luma(1, 0.1, 125.5)];
        assert!(detect_flashes(&exact, 1.0, &params()).events.is_empty());
    }

    #[test]
    fn test_single_event_has_zero_rate() {
        let samples = vec![FrameSample::luma(0, 0.0, 20.0), FrameSample::luma(1, 0.1, 200.0)];
        let analysis = detect_flashes(&samples, 1.0, &params());
        assert_eq!(analysis.events.len(), 1);
        assert_eq!(analysis.max_rate, 0);
        assert!(!analysis.exceeds_threshold);
        assert!(analysis.interval_stats.is_none());
    }

    #[test]
    fn test_zero_duration_is_empty() {
        let samples = alternating(10, 10.0, 40.0, 220.0);
        let analysis = detect_flashes(&samples, 0.0, &params());
        assert_eq!(analysis, FlashAnalysis::default());
    }

    #[test]
    fn test_events_outside_duration_dropped() {
        let samples = alternating(20, 10.0, 40.0, 220.0);
        let analysis = detect_flashes(&samples, 1.0, &params());
        assert!(analysis.events.iter().all(|e| e.timestamp <= 1.0));
        assert_eq!(analysis.events.len() + analysis.dropped_events, 19);
    }

    #[test]
    fn test_red_flashes() {
        let samples: Vec<FrameSample> = (0..10)
            .map(|i| {
                let s = FrameSample::luma(i, i as f64 * 0.1, if i % 2 == 0 { 30.0 } else { 120.0 });
                if i % 2 == 1 { s.with_chroma_v(230.0) } else { s.with_chroma_v(128.0) }
            })
            .collect();
        let analysis = detect_flashes(&samples, 1.0, &params());
        assert_eq!(analysis.red_event_count(), 9);
        assert!(analysis.red_exceeds_threshold);

        let findings = analysis.findings(1.0, 1.0);
        assert!(findings.iter().any(|f| f.kind == ViolationKind::RedFlash));
        assert!(findings.iter().all(|f| f.window.end <= 1.0));
    }

    #[test]
    fn test_invalid_samples_rejected() {
        let samples = vec![
            FrameSample::luma(0, 0.0, f64::NAN),
            FrameSample::luma(1, 0.1, 200.0),
            FrameSample::luma(2, 0.2, 400.0),
        ];
        let analysis = detect_flashes(&samples, 1.0, &params());
        assert!(analysis.events.is_empty());
        assert_eq!(analysis.rejected_pairs, 2);
    }
}
