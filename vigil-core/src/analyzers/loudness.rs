//! Programme loudness analyzer.

use super::{AnalysisContext, Analyzer, CategoryMetrics, CategoryOutput, describe_diagnostics};
use crate::category::Category;
use crate::config::EngineConfig;
use crate::detection::loudness::{LOUDNESS_KEYS, measure_loudness};
use crate::error::{CoreError, CoreResult};
use crate::external::{ProbeAdapter, ProbeInvocation, StreamKind, graphs};
use crate::signal::{Confidence, parse_metadata};
use log::info;
use std::sync::Arc;

pub struct LoudnessAnalyzer {
    config: Arc<EngineConfig>,
    adapter: ProbeAdapter,
}

impl LoudnessAnalyzer {
    pub fn new(config: Arc<EngineConfig>, adapter: ProbeAdapter) -> Self {
        Self { config, adapter }
    }
}

impl Analyzer for LoudnessAnalyzer {
    fn category(&self) -> Category {
        Category::Loudness
    }

    fn run(&self, ctx: &AnalysisContext) -> CoreResult<CategoryOutput> {
        if ctx.descriptor.audio.is_none() {
            return Err(CoreError::MalformedOutput(
                "no audio stream to measure".to_string(),
            ));
        }

        let invocation = ProbeInvocation::filter(
            ctx.source.clone(),
            StreamKind::Audio,
            graphs::LOUDNESS,
            self.category().name(),
        );
        let raw = self.adapter.invoke(&invocation, &ctx.token)?;
        let parsed = parse_metadata(&raw.stdout, LOUDNESS_KEYS);

        let measurement = measure_loudness(&parsed.frames).ok_or_else(|| {
            CoreError::MalformedOutput("no integrated loudness in ebur128 output".to_string())
        })?;

        info!(
            "Loudness: integrated {:.1} LUFS, range {}",
            measurement.integrated_lufs,
            measurement
                .loudness_range_lu
                .map_or_else(|| "n/a".to_string(), |lra| format!("{:.1} LU", lra))
        );

        Ok(CategoryOutput {
            category: Category::Loudness,
            confidence: Confidence::Definitive,
            findings: measurement.findings(ctx.descriptor.duration_secs, &self.config.loudness),
            metrics: CategoryMetrics::Loudness(measurement),
            rate_severity: None,
            regularity: None,
            diagnostics: describe_diagnostics(&parsed.diagnostics),
        })
    }
}
