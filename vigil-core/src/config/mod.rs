//! Configuration structures for the vigil-core engine.
//!
//! The configuration is split into sections the same way the detectors are
//! split: resources, one section per detector, and the scoring model. Every
//! section has defaults that can be overridden through `VIGIL_*` environment
//! variables, and the whole configuration can be loaded from a TOML file.

mod builder;
mod detection;
mod resource;
mod scoring;
pub mod utils;

pub use builder::EngineConfigBuilder;
pub use detection::{BlackConfig, FlashConfig, FormatConfig, LoudnessConfig, SceneConfig};
pub use resource::{MAX_CATEGORY_TIMEOUT_SECS, MAX_REAP_GRACE_MS, ResourceConfig};
pub use scoring::ScoringConfig;

use crate::category::Category;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Categories whose failure escalates to the whole request by default.
pub const DEFAULT_MANDATORY_CATEGORIES: &[&str] = &["flash"];

/// Main configuration structure for the analysis engine.
///
/// # Examples
///
/// ```rust
/// use vigil_core::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Names of the categories whose tool being unavailable fails the request
    pub mandatory_categories: Vec<String>,

    pub resources: ResourceConfig,
    pub flash: FlashConfig,
    pub scene: SceneConfig,
    pub black: BlackConfig,
    pub loudness: LoudnessConfig,
    pub format: FormatConfig,
    pub scoring: ScoringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mandatory_categories: utils::get_env_list(
                "VIGIL_MANDATORY_CATEGORIES",
                DEFAULT_MANDATORY_CATEGORIES,
            ),
            resources: ResourceConfig::default(),
            flash: FlashConfig::default(),
            scene: SceneConfig::default(),
            black: BlackConfig::default(),
            loudness: LoudnessConfig::default(),
            format: FormatConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads a configuration from a TOML file. Missing sections and fields
    /// fall back to their defaults.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| CoreError::Config(format!("failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Mandatory categories, parsed.
    pub fn mandatory(&self) -> CoreResult<Vec<Category>> {
        self.mandatory_categories
            .iter()
            .map(|name| {
                name.parse::<Category>().map_err(|_| {
                    CoreError::Config(format!("unknown mandatory category '{}'", name))
                })
            })
            .collect()
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> CoreResult<()> {
        self.mandatory()?;

        if self.resources.max_parallel == 0 {
            return Err(CoreError::Config("max_parallel must be at least 1".to_string()));
        }
        let timeout = self.resources.category_timeout_secs;
        if !(timeout > 0.0 && timeout <= MAX_CATEGORY_TIMEOUT_SECS) {
            return Err(CoreError::Config(format!(
                "category_timeout_secs must be in (0, {}], got {}",
                MAX_CATEGORY_TIMEOUT_SECS, timeout
            )));
        }
        if self.resources.reap_grace_ms > MAX_REAP_GRACE_MS {
            return Err(CoreError::Config(format!(
                "reap_grace_ms must not exceed {}, got {}",
                MAX_REAP_GRACE_MS, self.resources.reap_grace_ms
            )));
        }

        let flash = &self.flash;
        if !(0.0..=100.0).contains(&flash.flash_threshold_pct) || flash.flash_threshold_pct == 0.0 {
            return Err(CoreError::Config(format!(
                "flash_threshold_pct must be in (0, 100], got {}",
                flash.flash_threshold_pct
            )));
        }
        if !(0.0..=100.0).contains(&flash.dark_cap_pct) {
            return Err(CoreError::Config(format!(
                "dark_cap_pct must be in [0, 100], got {}",
                flash.dark_cap_pct
            )));
        }
        if !(flash.window_secs > 0.0) || !(self.scene.window_secs > 0.0) {
            return Err(CoreError::Config("sliding windows must be positive".to_string()));
        }
        if flash.max_flashes_per_window == 0 || self.scene.max_cuts_per_window == 0 {
            return Err(CoreError::Config("window limits must be at least 1".to_string()));
        }

        let scoring = &self.scoring;
        if scoring.partial_threshold > scoring.full_threshold {
            return Err(CoreError::Config(
                "partial_threshold must not exceed full_threshold".to_string(),
            ));
        }
        if (scoring.max_weight + scoring.avg_weight - 1.0).abs() > 1e-6 {
            return Err(CoreError::Config(format!(
                "risk weights must sum to 1.0, got {} + {}",
                scoring.max_weight, scoring.avg_weight
            )));
        }
        for (name, value) in [
            ("analysis_accuracy", scoring.analysis_accuracy),
            ("estimated_confidence", scoring.estimated_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Config(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.mandatory().unwrap().contains(&Category::Flash));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
mandatory_categories = ["flash", "loudness"]

[flash]
flash_threshold_pct = 12.5

[resources]
max_parallel = 2
"#,
        )
        .unwrap();

        assert_eq!(config.flash.flash_threshold_pct, 12.5);
        assert_eq!(config.flash.dark_cap_pct, FlashConfig::default().dark_cap_pct);
        assert_eq!(config.resources.max_parallel, 2);
        assert_eq!(
            config.mandatory().unwrap(),
            vec![Category::Flash, Category::Loudness]
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.mandatory_categories = vec!["nonsense".to_string()];
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.scoring.max_weight = 0.9;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.resources.max_parallel = 0;
        assert!(config.validate().is_err());

        assert!(EngineConfig::from_toml_str("[flash]\nflash_threshold_pct = \"high\"").is_err());
    }

    #[test]
    fn test_timeouts_are_bounded() {
        for timeout in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e30, MAX_CATEGORY_TIMEOUT_SECS + 1.0] {
            let mut config = EngineConfig::default();
            config.resources.category_timeout_secs = timeout;
            assert!(config.validate().is_err(), "timeout {} accepted", timeout);
        }

        let mut config = EngineConfig::default();
        config.resources.category_timeout_secs = MAX_CATEGORY_TIMEOUT_SECS;
        assert!(config.validate().is_ok());

        config.resources.reap_grace_ms = u64::MAX;
        assert!(config.validate().is_err());
    }
}
