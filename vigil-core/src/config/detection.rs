//! Detection configuration module
//!
//! Defines the thresholds used by the event detectors: flash and red-flash
//! detection, scene cut rate, black segments, loudness targets and the
//! delivery-format profile checked against the stream descriptor.

use serde::{Deserialize, Serialize};
use super::utils::*;

/// Flash (photosensitive epilepsy) detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    /// Minimum luminance change between adjacent frames, as a percentage of
    /// the luminance scale, for the pair to count as a flash transition
    pub flash_threshold_pct: f64,

    /// The darker frame of a flash pair must be strictly below this
    /// percentage of the luminance scale
    pub dark_cap_pct: f64,

    /// Sliding window length in seconds
    pub window_secs: f64,

    /// Events per window at or above which a period is critical
    pub max_flashes_per_window: u32,

    /// Minimum Cr (V plane) average, on an 8-bit scale, for a frame to be a
    /// saturated red frame
    pub red_chroma_min: f64,

    /// Scene score at or above which a frame counts as a cut when the
    /// scene-cut fallback has to stand in for luminance statistics
    pub fallback_cut_threshold: f64,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            flash_threshold_pct: get_env_f64("VIGIL_FLASH_THRESHOLD_PCT", 10.0),
            dark_cap_pct: get_env_f64("VIGIL_FLASH_DARK_CAP_PCT", 80.0),
            window_secs: get_env_f64("VIGIL_FLASH_WINDOW_SECS", 1.0),
            max_flashes_per_window: get_env_u32("VIGIL_MAX_FLASHES_PER_SECOND", 3),
            red_chroma_min: get_env_f64("VIGIL_RED_CHROMA_MIN", 170.0),
            fallback_cut_threshold: get_env_f64("VIGIL_FALLBACK_CUT_THRESHOLD", 0.4),
        }
    }
}

/// Scene cut rate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene score (0.0-1.0) at or above which a frame is a cut
    pub cut_threshold: f64,

    /// Sliding window length in seconds
    pub window_secs: f64,

    /// Cuts per window at or above which a period counts as rapid cutting
    pub max_cuts_per_window: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            cut_threshold: get_env_f64("VIGIL_SCENE_CUT_THRESHOLD", 0.4),
            window_secs: get_env_f64("VIGIL_SCENE_WINDOW_SECS", 1.0),
            max_cuts_per_window: get_env_u32("VIGIL_MAX_CUTS_PER_SECOND", 3),
        }
    }
}

/// Black frame detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackConfig {
    /// Pixel value threshold passed to the blackframe filter (8-bit)
    pub pixel_threshold: u32,

    /// Percentage of black pixels for a frame to be black
    pub black_amount_pct: f64,

    /// Longest tolerated black segment in seconds
    pub max_black_secs: f64,
}

impl Default for BlackConfig {
    fn default() -> Self {
        Self {
            pixel_threshold: get_env_u32("VIGIL_BLACK_PIXEL_THRESHOLD", 32),
            black_amount_pct: get_env_f64("VIGIL_BLACK_AMOUNT_PCT", 98.0),
            max_black_secs: get_env_f64("VIGIL_MAX_BLACK_SECS", 2.0),
        }
    }
}

/// Programme loudness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoudnessConfig {
    /// EBU R128 integrated loudness target (LUFS)
    pub ebu_target_lufs: f64,

    /// EBU R128 tolerance (LU)
    pub ebu_tolerance_lu: f64,

    /// ATSC A/85 integrated loudness target (LKFS)
    pub atsc_target_lkfs: f64,

    /// ATSC A/85 tolerance (LU)
    pub atsc_tolerance_lu: f64,
}

impl Default for LoudnessConfig {
    fn default() -> Self {
        Self {
            ebu_target_lufs: get_env_f64("VIGIL_EBU_TARGET_LUFS", -23.0),
            ebu_tolerance_lu: get_env_f64("VIGIL_EBU_TOLERANCE_LU", 1.0),
            atsc_target_lkfs: get_env_f64("VIGIL_ATSC_TARGET_LKFS", -24.0),
            atsc_tolerance_lu: get_env_f64("VIGIL_ATSC_TOLERANCE_LU", 2.0),
        }
    }
}

/// Delivery format profile checked against the stream descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Broadcast frame rates in frames per second
    pub allowed_frame_rates: Vec<f64>,

    /// Relative tolerance when matching frame rates
    pub frame_rate_tolerance: f64,

    /// Accepted pixel formats
    pub allowed_pixel_formats: Vec<String>,

    /// Accepted rasters as `[width, height]`
    pub allowed_resolutions: Vec<[u32; 2]>,

    /// Display aspect ratios considered broadcast-safe, as `[num, den]`
    pub broadcast_aspect_ratios: Vec<[u32; 2]>,

    /// Allowed deviation between signalled and computed display aspect
    /// ratio, as a percentage
    pub aspect_tolerance_pct: f64,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            allowed_frame_rates: vec![23.976, 24.0, 25.0, 29.97, 30.0, 50.0, 59.94, 60.0],
            frame_rate_tolerance: 0.001,
            allowed_pixel_formats: get_env_list(
                "VIGIL_ALLOWED_PIXEL_FORMATS",
                &["yuv420p", "yuv422p", "yuv420p10le", "yuv422p10le"],
            ),
            allowed_resolutions: vec![
                [720, 480],
                [720, 576],
                [1280, 720],
                [1920, 1080],
                [3840, 2160],
            ],
            broadcast_aspect_ratios: vec![[4, 3], [16, 9]],
            aspect_tolerance_pct: get_env_f64("VIGIL_ASPECT_TOLERANCE_PCT", 1.0),
        }
    }
}
