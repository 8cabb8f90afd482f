// ============================================================================
// vigil-core/src/media/descriptor.rs
// ============================================================================
//
// STREAM DESCRIPTOR: Technical Attributes Shared by Every Analyzer
//
// The descriptor is derived once per request from the introspection document
// and then shared read-only. Values that could not be parsed are left unset
// and recorded in `diagnostics`; nothing is coerced to a plausible default
// without saying so.

use super::schema::{ProbeDocument, ProbeStream};
use crate::error::{CoreError, CoreResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rational such as a sample or display aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub num: u32,
    pub den: u32,
}

impl Ratio {
    pub fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// Parses `"16:9"` or `"30000/1001"`. Zero components are rejected, which
    /// is how ffprobe spells "unknown" (`0:1`, `0/0`).
    pub fn parse(s: &str) -> Option<Self> {
        let (num, den) = s.split_once(':').or_else(|| s.split_once('/'))?;
        let num: u32 = num.trim().parse().ok()?;
        let den: u32 = den.trim().parse().ok()?;
        (num > 0 && den > 0).then_some(Self { num, den })
    }

    pub fn value(self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.num, self.den)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDescriptor {
    pub codec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_rate: Option<f64>,
    pub pix_fmt: Option<String>,
    pub bit_depth: u32,
    pub field_order: Option<String>,
    pub sample_aspect_ratio: Option<Ratio>,
    pub display_aspect_ratio: Option<Ratio>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioDescriptor {
    pub codec: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
}

/// Per-request technical description of the media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub container: Option<String>,
    pub duration_secs: f64,
    pub video: Option<VideoDescriptor>,
    pub audio: Option<AudioDescriptor>,
    /// Unknown fields and unparseable values found while decoding.
    pub diagnostics: Vec<String>,
}

/// Infers the bit depth from a pixel format name, e.g. `yuv420p10le` -> 10.
pub fn bit_depth_from_pix_fmt(pix_fmt: &str) -> u32 {
    let digits: String = pix_fmt
        .trim_end_matches("le")
        .trim_end_matches("be")
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    match digits.parse::<u32>() {
        Ok(bits @ 9..=16) if pix_fmt.contains('p') || pix_fmt.starts_with("gray") => bits,
        _ => 8,
    }
}

fn parse_seconds(field: &str, value: Option<&str>, diagnostics: &mut Vec<String>) -> Option<f64> {
    let raw = value?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => {
            diagnostics.push(format!("unparseable value {}='{}'", field, raw));
            None
        }
    }
}

fn parse_ratio(field: &str, value: Option<&str>, diagnostics: &mut Vec<String>) -> Option<Ratio> {
    let raw = value?;
    let ratio = Ratio::parse(raw);
    if ratio.is_none() {
        diagnostics.push(format!("unparseable value {}='{}'", field, raw));
    }
    ratio
}

fn video_from(stream: &ProbeStream, diagnostics: &mut Vec<String>) -> VideoDescriptor {
    let prefix = format!("streams[{}]", stream.index);

    let frame_rate = parse_ratio(
        &format!("{}.r_frame_rate", prefix),
        stream
            .r_frame_rate
            .as_deref()
            .or(stream.avg_frame_rate.as_deref()),
        diagnostics,
    )
    .map(Ratio::value);

    let bit_depth = match stream.bits_per_raw_sample.as_deref() {
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(bits @ 1..=16) => bits,
            _ => {
                diagnostics.push(format!(
                    "unparseable value {}.bits_per_raw_sample='{}'",
                    prefix, raw
                ));
                stream.pix_fmt.as_deref().map_or(8, bit_depth_from_pix_fmt)
            }
        },
        None => stream.pix_fmt.as_deref().map_or(8, bit_depth_from_pix_fmt),
    };

    VideoDescriptor {
        codec: stream.codec_name.clone(),
        width: stream.width.filter(|w| *w > 0),
        height: stream.height.filter(|h| *h > 0),
        frame_rate,
        pix_fmt: stream.pix_fmt.clone(),
        bit_depth,
        field_order: stream.field_order.clone(),
        sample_aspect_ratio: parse_ratio(
            &format!("{}.sample_aspect_ratio", prefix),
            stream.sample_aspect_ratio.as_deref(),
            diagnostics,
        ),
        display_aspect_ratio: parse_ratio(
            &format!("{}.display_aspect_ratio", prefix),
            stream.display_aspect_ratio.as_deref(),
            diagnostics,
        ),
    }
}

fn audio_from(stream: &ProbeStream, diagnostics: &mut Vec<String>) -> AudioDescriptor {
    let sample_rate = stream.sample_rate.as_deref().and_then(|raw| {
        let parsed = raw.trim().parse::<u32>().ok();
        if parsed.is_none() {
            diagnostics.push(format!(
                "unparseable value streams[{}].sample_rate='{}'",
                stream.index, raw
            ));
        }
        parsed
    });
    AudioDescriptor {
        codec: stream.codec_name.clone(),
        sample_rate,
        channels: stream.channels,
    }
}

impl StreamDescriptor {
    /// Decodes an ffprobe JSON document.
    pub fn from_probe_json(json: &str) -> CoreResult<Self> {
        let doc: ProbeDocument = serde_json::from_str(json).map_err(|e| {
            CoreError::MalformedOutput(format!("introspection document is not valid: {}", e))
        })?;
        Ok(Self::from_document(&doc))
    }

    pub fn from_document(doc: &ProbeDocument) -> Self {
        let mut diagnostics = doc.unknown_field_diagnostics();

        let first_of = |kind: &str| {
            doc.streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some(kind))
        };
        let video_stream = first_of("video");
        let video = video_stream.map(|s| video_from(s, &mut diagnostics));
        let audio = first_of("audio").map(|s| audio_from(s, &mut diagnostics));

        let container_duration = doc.format.as_ref().and_then(|f| {
            parse_seconds("format.duration", f.duration.as_deref(), &mut diagnostics)
        });
        let duration_secs = match container_duration {
            Some(d) => d,
            None => {
                let stream_duration = video_stream.and_then(|s| {
                    parse_seconds(
                        &format!("streams[{}].duration", s.index),
                        s.duration.as_deref(),
                        &mut diagnostics,
                    )
                });
                stream_duration.unwrap_or_else(|| {
                    diagnostics.push("no usable duration, assuming 0".to_string());
                    0.0
                })
            }
        };

        for d in &diagnostics {
            warn!("Introspection: {}", d);
        }
        debug!(
            "Stream descriptor: duration={:.3}s video={} audio={}",
            duration_secs,
            video.is_some(),
            audio.is_some()
        );

        Self {
            container: doc.format.as_ref().and_then(|f| f.format_name.clone()),
            duration_secs,
            video,
            audio,
            diagnostics,
        }
    }

    pub fn bit_depth(&self) -> u32 {
        self.video.as_ref().map_or(8, |v| v.bit_depth)
    }

    /// Full-scale luminance value, `2^bit_depth - 1`.
    pub fn luminance_scale(&self) -> f64 {
        ((1u64 << self.bit_depth()) - 1) as f64
    }

    pub fn frame_rate(&self) -> Option<f64> {
        self.video.as_ref().and_then(|v| v.frame_rate)
    }
}
