//! Frame samples and extraction confidence.

use super::metadata::MetadataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How much a result can be trusted.
///
/// Carried from extraction through to the compliance report so that an
/// estimate or a missing result is never mistaken for a definitive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Measured directly from per-frame statistics.
    Definitive,
    /// Derived from a cheaper proxy signal.
    Estimated,
    /// No usable data.
    Unavailable,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::Definitive => "definitive",
            Confidence::Estimated => "estimated",
            Confidence::Unavailable => "unavailable",
        })
    }
}

/// One timestamped per-frame measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    pub frame_index: u64,
    pub timestamp: f64,
    pub luminance_avg: f64,
    pub luminance_min: f64,
    pub luminance_max: f64,
    /// Average of the V (Cr) plane, when available.
    pub chroma_v_avg: Option<f64>,
    pub saturation_avg: Option<f64>,
    pub confidence: Confidence,
}

impl FrameSample {
    /// A definitive sample with only the luminance average known.
    pub fn luma(frame_index: u64, timestamp: f64, luminance_avg: f64) -> Self {
        Self {
            frame_index,
            timestamp,
            luminance_avg,
            luminance_min: luminance_avg,
            luminance_max: luminance_avg,
            chroma_v_avg: None,
            saturation_avg: None,
            confidence: Confidence::Definitive,
        }
    }

    pub fn with_chroma_v(mut self, chroma_v_avg: f64) -> Self {
        self.chroma_v_avg = Some(chroma_v_avg);
        self
    }
}

pub const KEY_YAVG: &str = "signalstats.YAVG";
pub const KEY_YMIN: &str = "signalstats.YMIN";
pub const KEY_YMAX: &str = "signalstats.YMAX";
pub const KEY_VAVG: &str = "signalstats.VAVG";
pub const KEY_SATAVG: &str = "signalstats.SATAVG";
pub const KEY_SCENE: &str = "scene_score";

/// Builds definitive luminance samples from signalstats frames.
///
/// Frames without `YAVG` carry no luminance information and are skipped.
/// Missing `YMIN`/`YMAX` fall back to the average.
pub fn luminance_samples(frames: &[MetadataFrame]) -> Vec<FrameSample> {
    frames
        .iter()
        .filter_map(|frame| {
            let avg = frame.get(KEY_YAVG)?;
            Some(FrameSample {
                frame_index: frame.frame_index,
                timestamp: frame.pts_time,
                luminance_avg: avg,
                luminance_min: frame.get(KEY_YMIN).unwrap_or(avg),
                luminance_max: frame.get(KEY_YMAX).unwrap_or(avg),
                chroma_v_avg: frame.get(KEY_VAVG),
                saturation_avg: frame.get(KEY_SATAVG),
                confidence: Confidence::Definitive,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::metadata::parse_metadata;

    #[test]
    fn test_samples_from_signalstats() {
        let parsed = parse_metadata(
            "frame:0 pts:0 pts_time:0\n\
             lavfi.signalstats.YAVG=100\n\
             lavfi.signalstats.YMIN=16\n\
             lavfi.signalstats.VAVG=200\n\
             frame:1 pts:1 pts_time:0.04\n\
             lavfi.scene_score=0.5\n\
             frame:2 pts:2 pts_time:0.08\n\
             lavfi.signalstats.YAVG=90\n",
            &[],
        );
        let samples = luminance_samples(&parsed.frames);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].luminance_min, 16.0);
        assert_eq!(samples[0].luminance_max, 100.0);
        assert_eq!(samples[0].chroma_v_avg, Some(200.0));
        assert_eq!(samples[1].frame_index, 2);
        assert!(samples.iter().all(|s| s.confidence == Confidence::Definitive));
    }
}
