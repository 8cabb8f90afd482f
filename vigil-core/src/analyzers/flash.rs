//! Flash and red-flash analyzer.

use super::{
    AnalysisContext, Analyzer, CategoryMetrics, CategoryOutput, analysis_span, describe_diagnostics,
};
use crate::category::Category;
use crate::config::EngineConfig;
use crate::detection::{FlashParams, detect_flashes};
use crate::error::{CoreError, CoreResult};
use crate::external::{ProbeAdapter, ProbeInvocation, StreamKind, graphs};
use crate::scoring::Severity;
use crate::signal::{Confidence, extract_luminance};
use log::{info, warn};
use std::sync::Arc;

pub struct FlashAnalyzer {
    config: Arc<EngineConfig>,
    adapter: ProbeAdapter,
}

impl FlashAnalyzer {
    pub fn new(config: Arc<EngineConfig>, adapter: ProbeAdapter) -> Self {
        Self { config, adapter }
    }
}

impl Analyzer for FlashAnalyzer {
    fn category(&self) -> Category {
        Category::Flash
    }

    fn run(&self, ctx: &AnalysisContext) -> CoreResult<CategoryOutput> {
        let flash = &self.config.flash;
        let invocation = ProbeInvocation::filter(
            ctx.source.clone(),
            StreamKind::Video,
            graphs::FLASH,
            self.category().name(),
        );
        let raw = self.adapter.invoke(&invocation, &ctx.token)?;

        let descriptor = &ctx.descriptor;
        let series = extract_luminance(
            &raw.stdout,
            flash.fallback_cut_threshold,
            descriptor.luminance_scale(),
        );
        if series.confidence == Confidence::Unavailable {
            return Err(CoreError::MalformedOutput(
                "no usable luminance or scene data in flash-analysis output".to_string(),
            ));
        }

        let params = FlashParams::from_config(flash, descriptor.bit_depth());
        let span = analysis_span(
            descriptor.duration_secs,
            series.samples.iter().map(|s| s.timestamp),
        )?;
        let duration = span.secs;
        let confidence = span.confidence(series.confidence);
        let analysis = detect_flashes(&series.samples, duration, &params);

        let mut diagnostics = describe_diagnostics(&series.diagnostics);
        if series.confidence == Confidence::Estimated {
            diagnostics.push("luminance estimated from scene cuts".to_string());
        }
        diagnostics.extend(span.diagnostic());
        if analysis.rejected_pairs > 0 {
            diagnostics.push(format!("rejected {} invalid sample pairs", analysis.rejected_pairs));
        }
        if analysis.dropped_events > 0 {
            warn!(
                "Flash: {} events outside the media duration were discarded",
                analysis.dropped_events
            );
        }

        info!(
            "Flash: {} events ({} red), max {} per {:.1}s ({})",
            analysis.events.len(),
            analysis.red_event_count(),
            analysis.max_rate,
            params.window_secs,
            confidence
        );

        let rate = analysis.max_rate.max(analysis.red_max_rate) as f64 / params.window_secs;
        Ok(CategoryOutput {
            category: Category::Flash,
            confidence,
            findings: analysis.findings(duration, params.window_secs),
            metrics: CategoryMetrics::Flash {
                samples: series.samples.len(),
                events: analysis.events.len(),
                red_events: analysis.red_event_count(),
                max_rate: analysis.max_rate,
                red_max_rate: analysis.red_max_rate,
                exceeds_threshold: analysis.exceeds_threshold,
                red_exceeds_threshold: analysis.red_exceeds_threshold,
                interval_stats: analysis.interval_stats,
                dropped_events: analysis.dropped_events,
            },
            rate_severity: Some(Severity::from_rate(rate)),
            regularity: analysis.interval_stats.map(|s| s.regularity),
            diagnostics,
        })
    }
}
