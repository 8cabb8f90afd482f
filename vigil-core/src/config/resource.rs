//! Resource management configuration module
//!
//! Defines the configuration structure for analyzer parallelism,
//! per-category deadlines, probe retries and external tool locations.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use super::utils::*;

/// Resource management configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    //
    // Parallelism settings
    //

    /// Maximum number of analyzer tasks running at the same time
    pub max_parallel: usize,

    //
    // Deadlines
    //

    /// Upper bound for a single category, in seconds.
    /// The effective deadline never exceeds the request's overall budget.
    pub category_timeout_secs: f64,

    /// Extra time granted after the overall deadline for killed tools to be reaped
    pub reap_grace_ms: u64,

    //
    // Probe adapter
    //

    /// Backoff before the single retry of a transient probe failure
    pub retry_backoff_ms: u64,

    /// Interval at which supervised processes are polled for exit or cancellation
    pub poll_interval_ms: u64,

    //
    // External tools
    //

    /// ffmpeg executable used for filter invocations
    pub ffmpeg_path: String,

    /// ffprobe executable used for structural introspection
    pub ffprobe_path: String,
}

/// Longest accepted per-category timeout (one week).
pub const MAX_CATEGORY_TIMEOUT_SECS: f64 = 7.0 * 24.0 * 3600.0;

/// Longest accepted reaping grace (one hour).
pub const MAX_REAP_GRACE_MS: u64 = 3_600_000;

impl ResourceConfig {
    pub fn category_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.category_timeout_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    pub fn reap_grace(&self) -> Duration {
        Duration::from_millis(self.reap_grace_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            // Analyzers mostly wait on ffmpeg, which is itself multi-threaded,
            // so there is no point in going beyond the core count.
            max_parallel: get_env_usize("VIGIL_MAX_PARALLEL", num_cpus::get().clamp(1, 8)),

            category_timeout_secs: get_env_f64("VIGIL_CATEGORY_TIMEOUT", 600.0),
            reap_grace_ms: get_env_u64("VIGIL_REAP_GRACE_MS", 500),

            retry_backoff_ms: get_env_u64("VIGIL_RETRY_BACKOFF_MS", 250),
            poll_interval_ms: get_env_u64("VIGIL_POLL_INTERVAL_MS", 50),

            ffmpeg_path: get_env_string("VIGIL_FFMPEG", "ffmpeg"),
            ffprobe_path: get_env_string("VIGIL_FFPROBE", "ffprobe"),
        }
    }
}
