// ============================================================================
// vigil-core/src/analyzers/mod.rs
// ============================================================================
//
// ANALYZERS: One Independently-Failing Task per Category
//
// An analyzer owns the full pipeline of one category: it asks the probe
// adapter for the data it needs, parses it, runs its detector and returns
// the findings together with summary metrics. It never scores; scoring is
// applied uniformly by the orchestrator task that runs it.
//
// Analyzers are built per request by `build_analyzers`; there is no global
// registry.
//
// KEY COMPONENTS:
// - Analyzer: the trait every category implements
// - AnalysisContext: what a task receives (source, shared descriptor, token)
// - CategoryOutput / CategoryMetrics: what a successful task returns

mod black;
mod descriptor;
mod flash;
mod loudness;
mod scene;

pub use black::BlackFramesAnalyzer;
pub use descriptor::{AspectRatioAnalyzer, StreamFormatAnalyzer};
pub use flash::FlashAnalyzer;
pub use loudness::LoudnessAnalyzer;
pub use scene::SceneCutsAnalyzer;

use crate::cancel::CancellationToken;
use crate::category::Category;
use crate::config::EngineConfig;
use crate::detection::loudness::LoudnessMeasurement;
use crate::detection::{Finding, IntervalStats};
use crate::error::{CoreError, CoreResult};
use crate::external::ProbeAdapter;
use crate::media::{Ratio, StreamDescriptor};
use crate::scoring::Severity;
use crate::signal::{Confidence, ParseDiagnostics};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a task needs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub source: PathBuf,
    pub descriptor: Arc<StreamDescriptor>,
    pub token: CancellationToken,
}

/// Per-category summary metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CategoryMetrics {
    Flash {
        samples: usize,
        events: usize,
        red_events: usize,
        max_rate: u32,
        red_max_rate: u32,
        exceeds_threshold: bool,
        red_exceeds_threshold: bool,
        interval_stats: Option<IntervalStats>,
        dropped_events: usize,
    },
    SceneCuts {
        cuts: usize,
        max_rate: u32,
        cuts_per_minute: f64,
        interval_stats: Option<IntervalStats>,
    },
    BlackFrames {
        segments: usize,
        total_black_secs: f64,
        longest_segment_secs: f64,
    },
    Loudness(LoudnessMeasurement),
    AspectRatio {
        signalled: Option<Ratio>,
        computed: Option<f64>,
    },
    StreamFormat {
        width: Option<u32>,
        height: Option<u32>,
        frame_rate: Option<f64>,
        pix_fmt: Option<String>,
    },
}

/// Result of a successful analyzer run.
#[derive(Debug, Clone)]
pub struct CategoryOutput {
    pub category: Category,
    pub confidence: Confidence,
    pub findings: Vec<Finding>,
    pub metrics: CategoryMetrics,
    /// Severity implied by the category's event rate, for rate categories.
    pub rate_severity: Option<Severity>,
    /// Regularity of the category's events, when it has events.
    pub regularity: Option<f64>,
    pub diagnostics: Vec<String>,
}

/// A quality-control check.
pub trait Analyzer: Send {
    fn category(&self) -> Category;

    fn run(&self, ctx: &AnalysisContext) -> CoreResult<CategoryOutput>;
}

/// Builds the analyzers for `categories`, in order.
pub fn build_analyzers(
    categories: &[Category],
    config: &Arc<EngineConfig>,
    adapter: &ProbeAdapter,
) -> Vec<Box<dyn Analyzer>> {
    categories
        .iter()
        .map(|category| -> Box<dyn Analyzer> {
            let config = Arc::clone(config);
            let adapter = adapter.clone();
            match category {
                Category::Flash => Box::new(FlashAnalyzer::new(config, adapter)),
                Category::SceneCuts => Box::new(SceneCutsAnalyzer::new(config, adapter)),
                Category::BlackFrames => Box::new(BlackFramesAnalyzer::new(config, adapter)),
                Category::Loudness => Box::new(LoudnessAnalyzer::new(config, adapter)),
                Category::AspectRatio => Box::new(AspectRatioAnalyzer::new(config)),
                Category::StreamFormat => Box::new(StreamFormatAnalyzer::new(config)),
            }
        })
        .collect()
}

/// Time span the detectors run over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AnalysisSpan {
    pub secs: f64,
    /// Taken from the sample timestamps because the container reported no
    /// usable duration.
    pub from_samples: bool,
}

impl AnalysisSpan {
    /// `confidence`, lowered to Estimated when the span is not the media's
    /// own duration.
    pub fn confidence(&self, confidence: Confidence) -> Confidence {
        if self.from_samples && confidence == Confidence::Definitive {
            Confidence::Estimated
        } else {
            confidence
        }
    }

    pub fn diagnostic(&self) -> Option<String> {
        self.from_samples.then(|| {
            format!(
                "media duration unknown, analysed the {:.3}s spanned by the samples",
                self.secs
            )
        })
    }
}

/// The media duration, or the latest sample timestamp when the descriptor
/// has none. A timeline of zero length is malformed output, never an empty
/// clean result.
pub(crate) fn analysis_span(
    duration_secs: f64,
    timestamps: impl IntoIterator<Item = f64>,
) -> CoreResult<AnalysisSpan> {
    if duration_secs.is_finite() && duration_secs > 0.0 {
        return Ok(AnalysisSpan {
            secs: duration_secs,
            from_samples: false,
        });
    }

    let latest = timestamps
        .into_iter()
        .filter(|t| t.is_finite())
        .fold(0.0_f64, f64::max);
    if latest > 0.0 {
        warn!(
            "Media duration unknown; using the {:.3}s spanned by the samples",
            latest
        );
        Ok(AnalysisSpan {
            secs: latest,
            from_samples: true,
        })
    } else {
        Err(CoreError::MalformedOutput(
            "media duration unknown and the samples span no time".to_string(),
        ))
    }
}

/// Human-readable parser diagnostics.
pub(crate) fn describe_diagnostics(diagnostics: &ParseDiagnostics) -> Vec<String> {
    let mut out = Vec::new();
    if diagnostics.skipped_lines > 0 {
        out.push(format!("skipped {} unparseable lines", diagnostics.skipped_lines));
    }
    if diagnostics.dropped_frames > 0 {
        out.push(format!(
            "dropped {} frames with missing or backwards timestamps",
            diagnostics.dropped_frames
        ));
    }
    if !diagnostics.unknown_keys.is_empty() {
        let keys: Vec<&str> = diagnostics.unknown_keys.iter().map(String::as_str).collect();
        out.push(format!("unknown keys: {}", keys.join(", ")));
    }
    out
}
