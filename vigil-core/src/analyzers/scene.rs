//! Scene cut rate analyzer.

use super::{
    AnalysisContext, Analyzer, CategoryMetrics, CategoryOutput, analysis_span, describe_diagnostics,
};
use crate::category::Category;
use crate::config::EngineConfig;
use crate::detection::scene::detect_cuts;
use crate::error::{CoreError, CoreResult};
use crate::external::{ProbeAdapter, ProbeInvocation, StreamKind, graphs};
use crate::scoring::Severity;
use crate::signal::samples::KEY_SCENE;
use crate::signal::{Confidence, parse_metadata};
use log::info;
use std::sync::Arc;

pub struct SceneCutsAnalyzer {
    config: Arc<EngineConfig>,
    adapter: ProbeAdapter,
}

impl SceneCutsAnalyzer {
    pub fn new(config: Arc<EngineConfig>, adapter: ProbeAdapter) -> Self {
        Self { config, adapter }
    }
}

impl Analyzer for SceneCutsAnalyzer {
    fn category(&self) -> Category {
        Category::SceneCuts
    }

    fn run(&self, ctx: &AnalysisContext) -> CoreResult<CategoryOutput> {
        let scene = &self.config.scene;
        let invocation = ProbeInvocation::filter(
            ctx.source.clone(),
            StreamKind::Video,
            graphs::SCENE,
            self.category().name(),
        );
        let raw = self.adapter.invoke(&invocation, &ctx.token)?;
        let parsed = parse_metadata(&raw.stdout, &[KEY_SCENE]);

        let span = analysis_span(
            ctx.descriptor.duration_secs,
            parsed.frames.iter().map(|f| f.pts_time),
        )?;
        let duration = span.secs;
        let analysis = detect_cuts(&parsed.frames, duration, scene);
        if analysis.scored_frames == 0 {
            return Err(CoreError::MalformedOutput(
                "no scene scores in scene-analysis output".to_string(),
            ));
        }

        info!(
            "Scene cuts: {} cuts, {:.1} per minute, max {} per {:.1}s",
            analysis.cut_times.len(),
            analysis.cuts_per_minute,
            analysis.max_rate,
            scene.window_secs
        );

        Ok(CategoryOutput {
            category: Category::SceneCuts,
            confidence: span.confidence(Confidence::Definitive),
            findings: analysis.findings(duration, scene),
            metrics: CategoryMetrics::SceneCuts {
                cuts: analysis.cut_times.len(),
                max_rate: analysis.max_rate,
                cuts_per_minute: analysis.cuts_per_minute,
                interval_stats: analysis.interval_stats,
            },
            rate_severity: Some(Severity::from_rate(
                analysis.max_rate as f64 / scene.window_secs,
            )),
            regularity: analysis.interval_stats.map(|s| s.regularity),
            diagnostics: describe_diagnostics(&parsed.diagnostics)
                .into_iter()
                .chain(span.diagnostic())
                .collect(),
        })
    }
}
