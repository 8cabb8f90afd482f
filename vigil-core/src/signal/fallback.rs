//! Scene-cut proxy for flash counting.
//!
//! When the luminance statistics are missing, hard cuts are the best
//! available stand-in for flashes: every cut is treated as a full-scale
//! luminance transition. The synthesised samples alternate between black and
//! full scale at each cut and are tagged [`Confidence::Estimated`]. The proxy
//! can only over-count transitions that are not flashes, and it misses flashes
//! that are not cuts, which is why it never reads as definitive.

use super::metadata::MetadataFrame;
use super::samples::{Confidence, FrameSample, KEY_SCENE};

/// Synthesises estimated samples from per-frame scene scores.
///
/// Returns an empty vector when no frame carries a scene score.
pub fn scene_cut_samples(frames: &[MetadataFrame], cut_threshold: f64, scale: f64) -> Vec<FrameSample> {
    let mut bright = false;
    frames
        .iter()
        .filter_map(|frame| {
            let score = frame.get(KEY_SCENE)?;
            if score >= cut_threshold {
                bright = !bright;
            }
            let level = if bright { scale } else { 0.0 };
            Some(FrameSample {
                frame_index: frame.frame_index,
                timestamp: frame.pts_time,
                luminance_avg: level,
                luminance_min: level,
                luminance_max: level,
                chroma_v_avg: None,
                saturation_avg: None,
                confidence: Confidence::Estimated,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn frame(i: u64, t: f64, score: Option<f64>) -> MetadataFrame {
        let mut values = BTreeMap::new();
        if let Some(s) = score {
            values.insert(KEY_SCENE.to_string(), s);
        }
        MetadataFrame {
            frame_index: i,
            pts_time: t,
            values,
        }
    }

    #[test]
    fn test_each_cut_toggles_level() {
        let frames = vec![
            frame(0, 0.0, Some(0.0)),
            frame(1, 0.1, Some(0.9)),
            frame(2, 0.2, Some(0.1)),
            frame(3, 0.3, Some(0.5)),
            frame(4, 0.4, None),
        ];
        let samples = scene_cut_samples(&frames, 0.4, 255.0);
        let levels: Vec<f64> = samples.iter().map(|s| s.luminance_avg).collect();
        assert_eq!(levels, vec![0.0, 255.0, 255.0, 0.0]);
        assert!(samples.iter().all(|s| s.confidence == Confidence::Estimated));
    }

    #[test]
    fn test_no_scores_no_samples() {
        let frames = vec![frame(0, 0.0, None)];
        assert!(scene_cut_samples(&frames, 0.4, 255.0).is_empty());
    }
}
