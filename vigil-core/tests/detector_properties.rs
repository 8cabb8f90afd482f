//! Invariants of the flash detector.
//!
//! These tests verify:
//! - Identical input gives identical output
//! - Adding flashes never lowers MaxRate
//! - Events stay ordered and inside the media duration
//! - The dark cap and threshold comparisons are strict

use proptest::prelude::*;
use vigil_core::config::FlashConfig;
use vigil_core::detection::{FlashParams, detect_flashes};
use vigil_core::signal::FrameSample;

fn params() -> FlashParams {
    FlashParams::from_config(&FlashConfig::default(), 8)
}

fn samples(fps: f64, values: &[f64]) -> Vec<FrameSample> {
    values
        .iter()
        .enumerate()
        .map(|(i, y)| FrameSample::luma(i as u64, i as f64 / fps, *y))
        .collect()
}

#[test]
fn test_dark_cap_boundary() {
    // Darker sample exactly at the cap (204 of 255) is not a flash.
    let at_cap = samples(10.0, &[204.0, 240.0]);
    assert!(detect_flashes(&at_cap, 1.0, &params()).events.is_empty());

    let below_cap = samples(10.0, &[203.0, 240.0]);
    let analysis = detect_flashes(&below_cap, 1.0, &params());
    assert_eq!(analysis.events.len(), 1);
    assert_eq!(analysis.events[0].frame_index, 1);
}

#[test]
fn test_alternating_two_seconds_at_ten_fps() {
    // Frames at 0.0, 0.1, ... 2.0 cover the whole two seconds.
    let values: Vec<f64> = (0..21).map(|i| if i % 2 == 0 { 40.0 } else { 220.0 }).collect();
    let analysis = detect_flashes(&samples(10.0, &values), 2.0, &params());
    assert!(analysis.events.len() >= 20, "{} events", analysis.events.len());
    assert_eq!(analysis.dropped_events, 0);
    assert!(analysis.max_rate >= 10);
    assert!(analysis.exceeds_threshold);
}

fn luminance_sequence() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..=255.0, 0..120)
}

proptest! {
    #[test]
    fn prop_detection_is_idempotent(values in luminance_sequence(), fps in 5.0f64..60.0) {
        let input = samples(fps, &values);
        let duration = values.len() as f64 / fps;
        let first = detect_flashes(&input, duration, &params());
        let second = detect_flashes(&input, duration, &params());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_events_ordered_and_in_range(values in luminance_sequence(), fps in 5.0f64..60.0) {
        let duration = values.len() as f64 / fps;
        let analysis = detect_flashes(&samples(fps, &values), duration, &params());
        for pair in analysis.events.windows(2) {
            prop_assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        for event in &analysis.events {
            prop_assert!(event.timestamp >= 0.0 && event.timestamp <= duration);
        }
    }

    #[test]
    fn prop_max_rate_monotonic_in_flash_density(
        base in prop::collection::vec(100.0f64..=140.0, 10..60),
        flips in prop::collection::vec(any::<bool>(), 60),
        extra in 0usize..60,
    ) {
        // Steady content with some frames pushed to black; pushing more
        // frames to black only adds transitions.
        let fps = 10.0;
        let duration = base.len() as f64 / fps;
        let sparse: Vec<f64> = base
            .iter()
            .enumerate()
            .map(|(i, y)| if flips[i] && i % 2 == 1 { 0.0 } else { *y })
            .collect();
        let dense: Vec<f64> = sparse
            .iter()
            .enumerate()
            .map(|(i, y)| if i % 2 == 1 && i < extra { 0.0 } else { *y })
            .collect();

        let sparse_rate = detect_flashes(&samples(fps, &sparse), duration, &params()).max_rate;
        let dense_rate = detect_flashes(&samples(fps, &dense), duration, &params()).max_rate;
        prop_assert!(dense_rate >= sparse_rate);
    }
}
