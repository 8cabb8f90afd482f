//! Check categories.
//!
//! A category is one independently-run quality-control check. Requests name
//! categories by their snake_case identifier; anything else is rejected before
//! dispatch.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An independently-run quality-control check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Photosensitive flash and red-flash risk
    Flash,
    /// Scene cut rate
    SceneCuts,
    /// Overlong black segments
    BlackFrames,
    /// Programme loudness against EBU R128 / ATSC A/85
    Loudness,
    /// Display aspect ratio signalling
    AspectRatio,
    /// Delivery format profile (raster, frame rate, pixel format)
    StreamFormat,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Flash,
        Category::SceneCuts,
        Category::BlackFrames,
        Category::Loudness,
        Category::AspectRatio,
        Category::StreamFormat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Flash => "flash",
            Category::SceneCuts => "scene_cuts",
            Category::BlackFrames => "black_frames",
            Category::Loudness => "loudness",
            Category::AspectRatio => "aspect_ratio",
            Category::StreamFormat => "stream_format",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::Flash => "Photosensitive flash and red-flash risk",
            Category::SceneCuts => "Scene cut rate",
            Category::BlackFrames => "Black segment duration",
            Category::Loudness => "Integrated programme loudness",
            Category::AspectRatio => "Display aspect ratio signalling",
            Category::StreamFormat => "Delivery format profile",
        }
    }

    /// Whether the category needs a filter invocation, as opposed to working
    /// purely from the stream descriptor.
    pub fn needs_filter(self) -> bool {
        !matches!(self, Category::AspectRatio | Category::StreamFormat)
    }

    /// Safety-critical categories must never read as "no risk" when they
    /// produced no data.
    pub fn is_safety_critical(self) -> bool {
        matches!(self, Category::Flash)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| CoreError::InvalidRequest(format!("unknown category '{}'", s)))
    }
}
