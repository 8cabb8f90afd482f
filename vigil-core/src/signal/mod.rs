// ============================================================================
// vigil-core/src/signal/mod.rs
// ============================================================================
//
// SIGNAL PARSER: Toolkit Output to Ordered Frame Samples
//
// KEY COMPONENTS:
// - metadata: tolerant line parser for print-stage output
// - samples: FrameSample, Confidence and signalstats extraction
// - fallback: scene-cut proxy used when luminance statistics are missing
//
// EXTRACTION CHAIN:
// 1. signalstats luminance samples            -> Definitive
// 2. scene-cut proxy samples from same output -> Estimated
// 3. nothing usable                           -> Unavailable (no samples)

pub mod fallback;
pub mod metadata;
pub mod samples;

pub use metadata::{MetadataFrame, ParseDiagnostics, ParsedMetadata, parse_metadata};
pub use samples::{Confidence, FrameSample};

use log::{debug, warn};

/// Key prefixes read from flash-analysis output.
pub const FLASH_KEYS: &[&str] = &["signalstats.", samples::KEY_SCENE];

/// Samples plus the confidence of the strategy that produced them.
#[derive(Debug, Clone)]
pub struct LuminanceSeries {
    pub samples: Vec<FrameSample>,
    pub confidence: Confidence,
    pub diagnostics: ParseDiagnostics,
}

/// Runs the extraction chain over flash-analysis output.
///
/// `scale` is the full-scale luminance value used by the fallback.
pub fn extract_luminance(text: &str, fallback_cut_threshold: f64, scale: f64) -> LuminanceSeries {
    let parsed = parse_metadata(text, FLASH_KEYS);

    let samples = samples::luminance_samples(&parsed.frames);
    if !samples.is_empty() {
        debug!("Extracted {} definitive luminance samples", samples.len());
        return LuminanceSeries {
            samples,
            confidence: Confidence::Definitive,
            diagnostics: parsed.diagnostics,
        };
    }

    let estimated = fallback::scene_cut_samples(&parsed.frames, fallback_cut_threshold, scale);
    if !estimated.is_empty() {
        warn!(
            "No luminance statistics found, using scene-cut proxy over {} frames",
            estimated.len()
        );
        return LuminanceSeries {
            samples: estimated,
            confidence: Confidence::Estimated,
            diagnostics: parsed.diagnostics,
        };
    }

    warn!("No usable luminance or scene data in flash-analysis output");
    LuminanceSeries {
        samples: Vec::new(),
        confidence: Confidence::Unavailable,
        diagnostics: parsed.diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitive_when_signalstats_present() {
        let series = extract_luminance(
            "frame:0 pts:0 pts_time:0\nlavfi.signalstats.YAVG=40\nlavfi.scene_score=0\n",
            0.4,
            255.0,
        );
        assert_eq!(series.confidence, Confidence::Definitive);
        assert_eq!(series.samples.len(), 1);
    }

    #[test]
    fn test_falls_back_to_scene_cuts() {
        let series = extract_luminance(
            "frame:0 pts:0 pts_time:0\nlavfi.scene_score=0.0\n\
             frame:1 pts:1 pts_time:0.1\nlavfi.scene_score=0.8\n",
            0.4,
            255.0,
        );
        assert_eq!(series.confidence, Confidence::Estimated);
        assert_eq!(series.samples.len(), 2);
        assert!(series.samples.iter().all(|s| s.confidence == Confidence::Estimated));
    }

    #[test]
    fn test_unavailable_when_nothing_parses() {
        let series = extract_luminance("Stream mapping:\n  Stream #0:0 -> #0:0\n", 0.4, 255.0);
        assert_eq!(series.confidence, Confidence::Unavailable);
        assert!(series.samples.is_empty());
        assert_eq!(series.diagnostics.skipped_lines, 2);
    }
}
