// ============================================================================
// vigil-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for EngineConfig
//
// This module implements the builder pattern for the EngineConfig structure,
// providing a fluent API for the parameters callers most often override.
// Everything not set explicitly keeps its default (including environment
// overrides), and the result is validated on build.

use super::EngineConfig;
use crate::category::Category;
use crate::error::CoreResult;
use std::time::Duration;

/// Builder for creating EngineConfig instances.
///
/// # Examples
///
/// ```rust
/// use vigil_core::config::EngineConfigBuilder;
/// use vigil_core::Category;
/// use std::time::Duration;
///
/// let config = EngineConfigBuilder::new()
///     .max_parallel(4)
///     .category_timeout(Duration::from_secs(90))
///     .mandatory(&[Category::Flash, Category::Loudness])
///     .build()
///     .unwrap();
/// assert_eq!(config.resources.max_parallel, 4);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfigBuilder {
    /// Creates a new builder starting from the default configuration.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Starts from an existing configuration, e.g. one loaded from a file.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Sets the maximum number of concurrently running analyzer tasks.
    pub fn max_parallel(mut self, value: usize) -> Self {
        self.config.resources.max_parallel = value;
        self
    }

    /// Sets the per-category deadline upper bound.
    pub fn category_timeout(mut self, value: Duration) -> Self {
        self.config.resources.category_timeout_secs = value.as_secs_f64();
        self
    }

    /// Sets the backoff before the single probe retry.
    pub fn retry_backoff(mut self, value: Duration) -> Self {
        self.config.resources.retry_backoff_ms = value.as_millis() as u64;
        self
    }

    /// Sets the ffmpeg executable.
    pub fn ffmpeg_path(mut self, value: impl Into<String>) -> Self {
        self.config.resources.ffmpeg_path = value.into();
        self
    }

    /// Sets the ffprobe executable.
    pub fn ffprobe_path(mut self, value: impl Into<String>) -> Self {
        self.config.resources.ffprobe_path = value.into();
        self
    }

    /// Sets the categories whose unavailability fails the whole request.
    pub fn mandatory(mut self, categories: &[Category]) -> Self {
        self.config.mandatory_categories = categories.iter().map(|c| c.name().to_string()).collect();
        self
    }

    /// Sets the flash transition threshold as a percentage of the luminance scale.
    pub fn flash_threshold_pct(mut self, value: f64) -> Self {
        self.config.flash.flash_threshold_pct = value;
        self
    }

    /// Sets the dark cap as a percentage of the luminance scale.
    pub fn dark_cap_pct(mut self, value: f64) -> Self {
        self.config.flash.dark_cap_pct = value;
        self
    }

    /// Sets the analysis accuracy factor reported with definitive results.
    pub fn analysis_accuracy(mut self, value: f64) -> Self {
        self.config.scoring.analysis_accuracy = value;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> CoreResult<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let config = EngineConfigBuilder::new()
            .max_parallel(3)
            .flash_threshold_pct(15.0)
            .mandatory(&[Category::Loudness])
            .build()
            .unwrap();

        assert_eq!(config.resources.max_parallel, 3);
        assert_eq!(config.flash.flash_threshold_pct, 15.0);
        assert_eq!(config.mandatory().unwrap(), vec![Category::Loudness]);
    }

    #[test]
    fn test_builder_validates() {
        assert!(EngineConfigBuilder::new().max_parallel(0).build().is_err());
        assert!(EngineConfigBuilder::new().analysis_accuracy(1.5).build().is_err());
    }
}
