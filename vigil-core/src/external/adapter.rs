// ============================================================================
// vigil-core/src/external/adapter.rs
// ============================================================================
//
// PROBE ADAPTER: Single Entry Point for All Toolkit Calls
//
// Wraps a ProbeToolkit with the engine's invocation policy:
// - nothing is started once the token is no longer active
// - a transient I/O failure is retried exactly once after a fixed backoff,
//   and only when the backoff still fits before the deadline
// - every other failure is returned unchanged for the caller to classify

use super::ffmpeg_toolkit::FfmpegToolkit;
use super::toolkit::{ProbeInvocation, ProbeToolkit, RawOutput};
use crate::cancel::CancellationToken;
use crate::config::ResourceConfig;
use crate::error::CoreResult;
use log::{debug, warn};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Shared, cloneable handle on the probe toolkit.
#[derive(Clone)]
pub struct ProbeAdapter {
    toolkit: Arc<dyn ProbeToolkit>,
    retry_backoff: Duration,
}

impl ProbeAdapter {
    pub fn new(toolkit: Arc<dyn ProbeToolkit>, retry_backoff: Duration) -> Self {
        Self {
            toolkit,
            retry_backoff,
        }
    }

    /// Adapter over the real ffmpeg/ffprobe toolkit.
    pub fn from_config(config: &ResourceConfig) -> Self {
        Self::new(
            Arc::new(FfmpegToolkit::from_config(config)),
            config.retry_backoff(),
        )
    }

    pub fn invoke(
        &self,
        invocation: &ProbeInvocation,
        token: &CancellationToken,
    ) -> CoreResult<RawOutput> {
        let started = Instant::now();
        token.checkpoint(invocation.tool(), started)?;
        debug!("Probe invocation: {}", invocation);

        let err = match self.toolkit.invoke(invocation, token) {
            Ok(output) => {
                debug!(
                    "Probe invocation {} finished in {:.2}s",
                    invocation.label(),
                    started.elapsed().as_secs_f64()
                );
                return Ok(output);
            }
            Err(e) => e,
        };

        if !err.is_transient() {
            debug!("Probe invocation {} failed: {}", invocation.label(), err);
            return Err(err);
        }

        let fits = token
            .remaining()
            .is_none_or(|left| left > self.retry_backoff);
        if !fits {
            warn!(
                "Transient failure of {} with no time left to retry: {}",
                invocation.label(),
                err
            );
            return Err(err);
        }

        warn!(
            "Transient failure of {}, retrying once in {:?}: {}",
            invocation.label(),
            self.retry_backoff,
            err
        );
        thread::sleep(self.retry_backoff);
        token.checkpoint(invocation.tool(), started)?;
        self.toolkit.invoke(invocation, token)
    }
}

impl std::fmt::Debug for ProbeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeAdapter")
            .field("retry_backoff", &self.retry_backoff)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::external::mocks::{ScriptedFailure, ScriptedToolkit};

    fn adapter(toolkit: &Arc<ScriptedToolkit>) -> ProbeAdapter {
        ProbeAdapter::new(toolkit.clone(), Duration::from_millis(5))
    }

    fn scene() -> ProbeInvocation {
        ProbeInvocation::filter(
            "in.mkv",
            crate::external::StreamKind::Video,
            "select",
            "scene_cuts",
        )
    }

    #[test]
    fn test_transient_failure_retried_once() {
        let toolkit = Arc::new(ScriptedToolkit::new());
        toolkit.fail("scene_cuts", ScriptedFailure::Transient);
        toolkit.respond("scene_cuts", "frame:0 pts:0 pts_time:0\n");

        let out = adapter(&toolkit)
            .invoke(&scene(), &CancellationToken::new())
            .unwrap();
        assert!(out.stdout.starts_with("frame:0"));
        assert_eq!(toolkit.calls_for("scene_cuts"), 2);
    }

    #[test]
    fn test_second_transient_failure_is_returned() {
        let toolkit = Arc::new(ScriptedToolkit::new());
        toolkit.fail("scene_cuts", ScriptedFailure::Transient);
        toolkit.fail("scene_cuts", ScriptedFailure::Transient);
        toolkit.respond("scene_cuts", "never reached");

        let err = adapter(&toolkit)
            .invoke(&scene(), &CancellationToken::new())
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(toolkit.calls_for("scene_cuts"), 2);
    }

    #[test]
    fn test_non_transient_failure_not_retried() {
        let toolkit = Arc::new(ScriptedToolkit::new());
        toolkit.fail("scene_cuts", ScriptedFailure::Unavailable);

        let err = adapter(&toolkit)
            .invoke(&scene(), &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolUnavailable);
        assert_eq!(toolkit.calls_for("scene_cuts"), 1);
    }

    #[test]
    fn test_inactive_token_starts_nothing() {
        let toolkit = Arc::new(ScriptedToolkit::new());
        toolkit.respond("scene_cuts", "");
        let token = CancellationToken::new();
        token.cancel();

        let err = adapter(&toolkit).invoke(&scene(), &token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(toolkit.invocation_count(), 0);
    }
}
