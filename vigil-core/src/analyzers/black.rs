//! Black segment analyzer.

use super::{
    AnalysisContext, Analyzer, CategoryMetrics, CategoryOutput, analysis_span, describe_diagnostics,
};
use crate::category::Category;
use crate::config::EngineConfig;
use crate::detection::black::detect_black;
use crate::error::{CoreError, CoreResult};
use crate::external::{ProbeAdapter, ProbeInvocation, StreamKind, graphs};
use crate::signal::{Confidence, parse_metadata};
use log::info;
use std::sync::Arc;

pub struct BlackFramesAnalyzer {
    config: Arc<EngineConfig>,
    adapter: ProbeAdapter,
}

impl BlackFramesAnalyzer {
    pub fn new(config: Arc<EngineConfig>, adapter: ProbeAdapter) -> Self {
        Self { config, adapter }
    }
}

impl Analyzer for BlackFramesAnalyzer {
    fn category(&self) -> Category {
        Category::BlackFrames
    }

    fn run(&self, ctx: &AnalysisContext) -> CoreResult<CategoryOutput> {
        let black = &self.config.black;
        let invocation = ProbeInvocation::filter(
            ctx.source.clone(),
            StreamKind::Video,
            graphs::black(black.pixel_threshold),
            self.category().name(),
        );
        let raw = self.adapter.invoke(&invocation, &ctx.token)?;
        let parsed = parse_metadata(&raw.stdout, &["blackframe."]);

        let span = analysis_span(
            ctx.descriptor.duration_secs,
            parsed.frames.iter().map(|f| f.pts_time),
        )?;
        let analysis = detect_black(&parsed.frames, span.secs, black);
        if analysis.measured_frames == 0 {
            return Err(CoreError::MalformedOutput(
                "no blackframe measurements in output".to_string(),
            ));
        }

        info!(
            "Black frames: {} segments, {:.2}s total, longest {:.2}s",
            analysis.segments.len(),
            analysis.total_black_secs,
            analysis.longest_segment_secs
        );

        Ok(CategoryOutput {
            category: Category::BlackFrames,
            confidence: span.confidence(Confidence::Definitive),
            findings: analysis.findings(black),
            metrics: CategoryMetrics::BlackFrames {
                segments: analysis.segments.len(),
                total_black_secs: analysis.total_black_secs,
                longest_segment_secs: analysis.longest_segment_secs,
            },
            rate_severity: None,
            regularity: None,
            diagnostics: describe_diagnostics(&parsed.diagnostics)
                .into_iter()
                .chain(span.diagnostic())
                .collect(),
        })
    }
}
