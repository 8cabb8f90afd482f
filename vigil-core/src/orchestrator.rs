// ============================================================================
// vigil-core/src/orchestrator.rs
// ============================================================================
//
// ORCHESTRATOR: Fan-Out of Category Tasks, Fan-In of Sections
//
// Runs one request end to end:
//
// 1. The request is validated; an invalid request fails before any tool is
//    invoked.
// 2. The media item is introspected once and the descriptor is shared by
//    every task.
// 3. One task per category is dispatched onto a bounded rayon pool. Each task
//    gets a child token whose deadline is the earlier of the request deadline
//    and its own per-category timeout. Deadlines past the clock's range are
//    treated as absent.
// 4. Tasks report a section over an mpsc channel. The collector waits until
//    every task reported or the request deadline plus the reaping grace has
//    passed; a category that never reported is recorded as timed out.
// 5. The aggregator seals the record.
//
// Request-level failures (invalid request, failed introspection, no worker
// pool, an unavailable tool in a mandatory category, parent cancellation)
// seal the record as Failed and discard partial results.

use crate::aggregate;
use crate::analyzers::{AnalysisContext, Analyzer, build_analyzers};
use crate::cancel::CancellationToken;
use crate::category::Category;
use crate::config::EngineConfig;
use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::external::{ProbeAdapter, ProbeInvocation, ProbeToolkit};
use crate::media::StreamDescriptor;
use crate::record::{AnalysisRecord, AnalysisRequest, CategorySection};
use crate::scoring::{category_risk, violations_for};
use log::{debug, error, info, warn};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

type Report = (Category, CategorySection);

/// Runs analysis requests against a probe toolkit.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: Arc<EngineConfig>,
    adapter: ProbeAdapter,
}

impl Orchestrator {
    /// An orchestrator over the real ffmpeg/ffprobe toolkit.
    pub fn new(config: EngineConfig) -> CoreResult<Self> {
        config.validate()?;
        let adapter = ProbeAdapter::from_config(&config.resources);
        Ok(Self {
            config: Arc::new(config),
            adapter,
        })
    }

    /// An orchestrator over a caller-supplied toolkit.
    pub fn with_toolkit(config: EngineConfig, toolkit: Arc<dyn ProbeToolkit>) -> CoreResult<Self> {
        config.validate()?;
        let adapter = ProbeAdapter::new(toolkit, config.resources.retry_backoff());
        Ok(Self {
            config: Arc::new(config),
            adapter,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs `request` to completion. The returned record is always sealed.
    pub fn run(&self, request: &AnalysisRequest) -> AnalysisRecord {
        self.run_with_token(request, &CancellationToken::new())
    }

    /// Runs `request` under `parent`; cancelling `parent` fails the request.
    pub fn run_with_token(
        &self,
        request: &AnalysisRequest,
        parent: &CancellationToken,
    ) -> AnalysisRecord {
        let mut record = AnalysisRecord::new(request);
        info!(
            "Request {}: analysing {}",
            request.request_id,
            request.source.display()
        );

        if let Err(err) = self.execute(request, parent, &mut record) {
            error!("Request {} failed: {}", request.request_id, err);
            if let Err(seal_err) = record.fail(&err) {
                // Only reachable if the record was sealed before the failure.
                error!("Request {}: {}", request.request_id, seal_err);
            }
        }
        record
    }

    fn execute(
        &self,
        request: &AnalysisRequest,
        parent: &CancellationToken,
        record: &mut AnalysisRecord,
    ) -> CoreResult<()> {
        let categories = request.categories()?;
        record.start()?;

        let started = Instant::now();
        // A budget past the clock's range leaves the request unbounded.
        let deadline = started.checked_add(request.time_budget);
        if deadline.is_none() {
            warn!(
                "Request {}: time budget {:?} is out of range, running without a deadline",
                request.request_id, request.time_budget
            );
        }
        let request_token = parent.child(deadline);

        let descriptor = self.introspect(request, &request_token)?;
        record.set_descriptor(descriptor.clone())?;
        let descriptor = Arc::new(descriptor);

        let analyzers = build_analyzers(&categories, &self.config, &self.adapter);
        let threads = self.config.resources.max_parallel.min(analyzers.len()).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("vigil-analyzer-{}", i))
            .build()
            .map_err(|e| {
                CoreError::ResourceExhausted(format!("failed to create worker pool: {}", e))
            })?;
        info!(
            "Request {}: dispatching {} categories on {} worker(s)",
            request.request_id,
            analyzers.len(),
            threads
        );

        let (tx, rx) = mpsc::channel::<Report>();
        let mut tokens = BTreeMap::new();
        for analyzer in analyzers {
            let category = analyzer.category();
            let task_deadline = Instant::now().checked_add(self.config.resources.category_timeout());
            let ctx = AnalysisContext {
                source: request.source.clone(),
                descriptor: Arc::clone(&descriptor),
                token: request_token.child(task_deadline),
            };
            tokens.insert(category, ctx.token.clone());

            let config = Arc::clone(&self.config);
            let tx = tx.clone();
            pool.spawn(move || run_task(analyzer, ctx, config, tx));
        }
        drop(tx);

        let sections = self.collect(
            &rx,
            &categories,
            parent,
            &request_token,
            deadline.and_then(|d| d.checked_add(self.config.resources.reap_grace())),
            &tokens,
        )?;

        aggregate::finalize(record, sections, &categories, &self.config.scoring)?;
        info!(
            "Request {} finished in {:.2}s",
            request.request_id,
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    fn introspect(
        &self,
        request: &AnalysisRequest,
        token: &CancellationToken,
    ) -> CoreResult<StreamDescriptor> {
        let output = self
            .adapter
            .invoke(&ProbeInvocation::introspect(request.source.clone()), token)?;
        let descriptor = StreamDescriptor::from_probe_json(&output.stdout)?;
        debug!(
            "Request {}: {:.2}s, video: {}, audio: {}",
            request.request_id,
            descriptor.duration_secs,
            descriptor.video.is_some(),
            descriptor.audio.is_some()
        );
        Ok(descriptor)
    }

    /// Collects sections until every category reported or `hard_stop`
    /// passes. Without a hard stop the collector waits for every task, each
    /// of which is still bounded by its category timeout.
    fn collect(
        &self,
        rx: &Receiver<Report>,
        categories: &[Category],
        parent: &CancellationToken,
        request_token: &CancellationToken,
        hard_stop: Option<Instant>,
        tokens: &BTreeMap<Category, CancellationToken>,
    ) -> CoreResult<Vec<CategorySection>> {
        let mandatory = self.config.mandatory()?;
        let poll = self.config.resources.poll_interval();
        let mut sections: BTreeMap<Category, CategorySection> = BTreeMap::new();

        while sections.len() < categories.len() {
            if parent.is_cancelled() {
                request_token.cancel();
                self.drain(rx, categories.len() - sections.len());
                return Err(CoreError::Cancelled("parent request cancelled".to_string()));
            }

            let wait = match hard_stop {
                Some(stop) => {
                    let left = stop.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        break;
                    }
                    poll.min(left)
                }
                None => poll,
            };

            match rx.recv_timeout(wait) {
                Ok((category, section)) => {
                    if mandatory.contains(&category)
                        && section.error.as_ref().map(|e| e.kind) == Some(ErrorKind::ToolUnavailable)
                    {
                        request_token.cancel();
                        let message = section
                            .error
                            .map(|e| e.message)
                            .unwrap_or_default();
                        self.drain(rx, categories.len() - sections.len() - 1);
                        return Err(CoreError::ToolUnavailable {
                            tool: category.name().to_string(),
                            reason: format!("mandatory category unavailable: {}", message),
                        });
                    }
                    sections.insert(category, section);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        for category in categories {
            if sections.contains_key(category) {
                continue;
            }
            if let Some(token) = tokens.get(category) {
                token.cancel();
            }
            warn!("{}: no result before the request deadline", category);
            sections.insert(
                *category,
                CategorySection::degraded(
                    *category,
                    ErrorKind::ToolTimeout,
                    "no result before the request deadline",
                    Duration::ZERO,
                ),
            );
        }

        Ok(sections.into_values().collect())
    }

    /// Waits up to the reaping grace for `pending` cancelled tasks to report.
    fn drain(&self, rx: &Receiver<Report>, pending: usize) {
        let started = Instant::now();
        let grace = self.config.resources.reap_grace();
        let mut left = pending;
        while left > 0 {
            let Some(wait) = grace.checked_sub(started.elapsed()).filter(|w| !w.is_zero()) else {
                warn!("{} task(s) still running after cancellation", left);
                return;
            };
            match rx.recv_timeout(wait) {
                Ok((category, _)) => {
                    debug!("{}: stopped after cancellation", category);
                    left -= 1;
                }
                Err(_) => return,
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Body of one category task: run, score, report.
fn run_task(
    analyzer: Box<dyn Analyzer>,
    ctx: AnalysisContext,
    config: Arc<EngineConfig>,
    tx: Sender<Report>,
) {
    let category = analyzer.category();
    let started = Instant::now();
    debug!("{}: started", category);

    let outcome = catch_unwind(AssertUnwindSafe(|| analyzer.run(&ctx)));
    let elapsed = started.elapsed();

    let section = match outcome {
        Ok(Ok(output)) => {
            let violations = violations_for(category, &output.findings, &config);
            let risk = category_risk(output.rate_severity, &violations, output.regularity);
            debug!(
                "{}: {} violation(s), risk {:.1}, {:.2}s",
                category,
                violations.len(),
                risk,
                elapsed.as_secs_f64()
            );
            CategorySection::from_output(output, violations, risk, elapsed)
        }
        Ok(Err(err)) => {
            warn!("{}: degraded: {}", category, err);
            CategorySection::from_error(category, &err, elapsed)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("{}: analyzer panicked: {}", category, message);
            CategorySection::degraded(
                category,
                ErrorKind::Internal,
                format!("analyzer panicked: {}", message),
                elapsed,
            )
        }
    };

    // The collector may have given up on this request already.
    if tx.send((category, section)).is_err() {
        debug!("{}: result arrived after the request was sealed", category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{ScriptedFailure, ScriptedToolkit};
    use crate::record::RecordStatus;

    const PROBE: &str = r#"{
        "format": {"format_name": "mov,mp4", "duration": "2.0"},
        "streams": [
            {"codec_type": "video", "width": 1920, "height": 1080,
             "display_aspect_ratio": "16:9", "sample_aspect_ratio": "1:1",
             "pix_fmt": "yuv420p", "r_frame_rate": "25/1"}
        ]
    }"#;

    fn orchestrator(toolkit: &Arc<ScriptedToolkit>) -> Orchestrator {
        let mut config = EngineConfig::default();
        config.resources.reap_grace_ms = 50;
        config.resources.poll_interval_ms = 5;
        Orchestrator::with_toolkit(config, toolkit.clone()).unwrap()
    }

    #[test]
    fn test_descriptor_only_request_completes() {
        let toolkit = Arc::new(ScriptedToolkit::new());
        toolkit.respond("introspect", PROBE);
        let request = AnalysisRequest::new(
            "clip.mp4",
            ["aspect_ratio", "stream_format"],
            Duration::from_secs(5),
        );

        let record = orchestrator(&toolkit).run(&request);
        assert_eq!(record.status(), RecordStatus::Completed);
        assert_eq!(record.sections().len(), 2);
        assert_eq!(toolkit.invocation_count(), 1);
    }

    #[test]
    fn test_failed_introspection_fails_request() {
        let toolkit = Arc::new(ScriptedToolkit::new());
        toolkit.fail("introspect", ScriptedFailure::Malformed);
        let request = AnalysisRequest::new("clip.mp4", ["aspect_ratio"], Duration::from_secs(5));

        let record = orchestrator(&toolkit).run(&request);
        assert_eq!(record.status(), RecordStatus::Failed);
        assert_eq!(record.failure().unwrap().kind, ErrorKind::MalformedOutput);
        assert!(record.sections().is_empty());
    }

    #[test]
    fn test_mandatory_tool_unavailable_fails_request() {
        let toolkit = Arc::new(ScriptedToolkit::new());
        toolkit.respond("introspect", PROBE);
        toolkit.fail("flash", ScriptedFailure::Unavailable);
        let request = AnalysisRequest::new(
            "clip.mp4",
            ["flash", "aspect_ratio"],
            Duration::from_secs(5),
        );

        let record = orchestrator(&toolkit).run(&request);
        assert_eq!(record.status(), RecordStatus::Failed);
        assert_eq!(record.failure().unwrap().kind, ErrorKind::ToolUnavailable);
    }

    #[test]
    fn test_optional_tool_unavailable_degrades() {
        let toolkit = Arc::new(ScriptedToolkit::new());
        toolkit.respond("introspect", PROBE);
        toolkit.fail("scene_cuts", ScriptedFailure::Unavailable);
        let request = AnalysisRequest::new(
            "clip.mp4",
            ["scene_cuts", "stream_format"],
            Duration::from_secs(5),
        );

        let record = orchestrator(&toolkit).run(&request);
        assert_eq!(record.status(), RecordStatus::PartialFailure);
        let section = record.section(Category::SceneCuts).unwrap();
        assert_eq!(section.error.as_ref().unwrap().kind, ErrorKind::ToolUnavailable);
        assert!(!record.is_degraded(Category::StreamFormat));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
