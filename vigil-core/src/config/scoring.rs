//! Scoring configuration module
//!
//! Penalties, compliance level breakpoints and the weighting used to fold
//! category risks into the overall risk score. The accuracy and confidence
//! factors are parameters rather than constants so deployments can set
//! measured values.

use serde::{Deserialize, Serialize};
use super::utils::*;

/// Risk scorer and compliance mapper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    //
    // Penalty model (points deducted per violation instance)
    //

    /// General flash threshold exceeded
    pub flash_penalty: f64,

    /// Red-flash specific violation
    pub red_flash_penalty: f64,

    /// Rapid cutting period
    pub rapid_cuts_penalty: f64,

    /// Overlong black segment
    pub black_segment_penalty: f64,

    /// Integrated loudness outside target tolerance
    pub loudness_penalty: f64,

    /// Aspect ratio signalling problem
    pub aspect_ratio_penalty: f64,

    /// Delivery format deviation
    pub format_penalty: f64,

    //
    // Compliance levels
    //

    /// Score at or above which a standard is fully met
    pub full_threshold: f64,

    /// Score at or above which a standard is partially met
    pub partial_threshold: f64,

    //
    // Overall risk
    //

    /// Weight of the highest category risk
    pub max_weight: f64,

    /// Weight of the average category risk
    pub avg_weight: f64,

    //
    // Confidence factors
    //

    /// Accuracy reported for definitive analyses (0.0-1.0)
    pub analysis_accuracy: f64,

    /// Factor applied to the accuracy of estimated (fallback) analyses
    pub estimated_confidence: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            flash_penalty: get_env_f64("VIGIL_FLASH_PENALTY", 20.0),
            red_flash_penalty: get_env_f64("VIGIL_RED_FLASH_PENALTY", 30.0),
            rapid_cuts_penalty: get_env_f64("VIGIL_RAPID_CUTS_PENALTY", 10.0),
            black_segment_penalty: get_env_f64("VIGIL_BLACK_SEGMENT_PENALTY", 5.0),
            loudness_penalty: get_env_f64("VIGIL_LOUDNESS_PENALTY", 25.0),
            aspect_ratio_penalty: get_env_f64("VIGIL_ASPECT_RATIO_PENALTY", 15.0),
            format_penalty: get_env_f64("VIGIL_FORMAT_PENALTY", 10.0),

            full_threshold: 90.0,
            partial_threshold: 70.0,

            max_weight: 0.7,
            avg_weight: 0.3,

            analysis_accuracy: get_env_f64("VIGIL_ANALYSIS_ACCURACY", 0.85),
            estimated_confidence: get_env_f64("VIGIL_ESTIMATED_CONFIDENCE", 0.5),
        }
    }
}
