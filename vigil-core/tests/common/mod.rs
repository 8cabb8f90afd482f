//! Shared fixtures for the integration tests.
//!
//! Responses are scripted per invocation label: "introspect" for the
//! structural probe, and the category name for each filter run.

#![allow(dead_code)]

use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use vigil_core::EngineConfig;
use vigil_core::Orchestrator;
use vigil_core::external::mocks::ScriptedToolkit;

/// ffprobe document for an 8-bit 1080p25 item with a stereo audio track.
pub fn probe_json(duration_secs: f64) -> String {
    probe_json_with_duration(&format!("{:.3}", duration_secs))
}

/// Same document with a raw `format.duration` value, e.g. "N/A".
pub fn probe_json_with_duration(duration: &str) -> String {
    format!(
        r#"{{
  "streams": [
    {{"index": 0, "codec_type": "video", "codec_name": "h264",
      "width": 1920, "height": 1080, "pix_fmt": "yuv420p",
      "r_frame_rate": "25/1", "avg_frame_rate": "25/1",
      "sample_aspect_ratio": "1:1", "display_aspect_ratio": "16:9"}},
    {{"index": 1, "codec_type": "audio", "codec_name": "aac",
      "sample_rate": "48000", "channels": 2}}
  ],
  "format": {{"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "{}"}}
}}"#,
        duration
    )
}

/// Frame-tagged signalstats output for the given per-frame luminance.
pub fn luminance_output(fps: f64, values: &[f64]) -> String {
    let mut out = String::new();
    for (i, y) in values.iter().enumerate() {
        let t = i as f64 / fps;
        writeln!(out, "frame:{} pts:{} pts_time:{}", i, i, t).unwrap();
        writeln!(out, "lavfi.signalstats.YAVG={}", y).unwrap();
        writeln!(out, "lavfi.scene_score=0.000").unwrap();
    }
    out
}

/// Frame-tagged output carrying only scene scores.
pub fn scene_output(fps: f64, scores: &[f64]) -> String {
    let mut out = String::new();
    for (i, score) in scores.iter().enumerate() {
        let t = i as f64 / fps;
        writeln!(out, "frame:{} pts:{} pts_time:{}", i, i, t).unwrap();
        writeln!(out, "lavfi.scene_score={}", score).unwrap();
    }
    out
}

/// 40/220 alternating luminance.
pub fn alternating(frames: usize) -> Vec<f64> {
    (0..frames)
        .map(|i| if i % 2 == 0 { 40.0 } else { 220.0 })
        .collect()
}

/// Configuration with short grace and poll intervals so tests finish fast.
pub fn fast_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.mandatory_categories = vec!["flash".to_string()];
    config.resources.max_parallel = 4;
    config.resources.reap_grace_ms = 100;
    config.resources.poll_interval_ms = 5;
    config.resources.retry_backoff_ms = 5;
    config
}

pub fn orchestrator(toolkit: &Arc<ScriptedToolkit>) -> Orchestrator {
    Orchestrator::with_toolkit(fast_config(), toolkit.clone()).unwrap()
}

pub fn budget() -> Duration {
    Duration::from_secs(10)
}
