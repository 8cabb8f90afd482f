//! Descriptor-only analyzers: aspect ratio signalling and delivery format.
//!
//! Neither needs a filter invocation; both work from the shared descriptor.

use super::{AnalysisContext, Analyzer, CategoryMetrics, CategoryOutput};
use crate::category::Category;
use crate::config::EngineConfig;
use crate::detection::format::{check_aspect_ratio, check_stream_format, computed_display_aspect};
use crate::error::CoreResult;
use crate::signal::Confidence;
use std::sync::Arc;
use std::time::Instant;

pub struct AspectRatioAnalyzer {
    config: Arc<EngineConfig>,
}

impl AspectRatioAnalyzer {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }
}

impl Analyzer for AspectRatioAnalyzer {
    fn category(&self) -> Category {
        Category::AspectRatio
    }

    fn run(&self, ctx: &AnalysisContext) -> CoreResult<CategoryOutput> {
        ctx.token.checkpoint(self.category().name(), Instant::now())?;
        let descriptor = &ctx.descriptor;
        let findings = check_aspect_ratio(descriptor, &self.config.format)?;
        let video = descriptor.video.as_ref();

        Ok(CategoryOutput {
            category: Category::AspectRatio,
            confidence: Confidence::Definitive,
            findings,
            metrics: CategoryMetrics::AspectRatio {
                signalled: video.and_then(|v| v.display_aspect_ratio),
                computed: video.and_then(computed_display_aspect),
            },
            rate_severity: None,
            regularity: None,
            diagnostics: descriptor.diagnostics.clone(),
        })
    }
}

pub struct StreamFormatAnalyzer {
    config: Arc<EngineConfig>,
}

impl StreamFormatAnalyzer {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }
}

impl Analyzer for StreamFormatAnalyzer {
    fn category(&self) -> Category {
        Category::StreamFormat
    }

    fn run(&self, ctx: &AnalysisContext) -> CoreResult<CategoryOutput> {
        ctx.token.checkpoint(self.category().name(), Instant::now())?;
        let descriptor = &ctx.descriptor;
        let findings = check_stream_format(descriptor, &self.config.format)?;
        let video = descriptor.video.as_ref();

        Ok(CategoryOutput {
            category: Category::StreamFormat,
            confidence: Confidence::Definitive,
            findings,
            metrics: CategoryMetrics::StreamFormat {
                width: video.and_then(|v| v.width),
                height: video.and_then(|v| v.height),
                frame_rate: video.and_then(|v| v.frame_rate),
                pix_fmt: video.and_then(|v| v.pix_fmt.clone()),
            },
            rate_severity: None,
            regularity: None,
            diagnostics: Vec::new(),
        })
    }
}
