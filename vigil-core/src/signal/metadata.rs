// ============================================================================
// vigil-core/src/signal/metadata.rs
// ============================================================================
//
// METADATA PARSER: Frame-Tagged Key/Value Text to Typed Frames
//
// The print stage of an ffmpeg filter graph writes one header per frame
// followed by that frame's `lavfi.*` values:
//
//   frame:12   pts:12288   pts_time:0.48
//   lavfi.signalstats.YAVG=112.4
//   lavfi.scene_score=0.012
//
// When the output went through ffmpeg's logger instead of a file, every line
// carries a `[Parsed_metadata_1 @ 0x...]` prefix, which is stripped.
//
// Parsing never fails. Lines that are not understood are skipped and counted,
// keys outside the caller's known prefixes are reported, and frames whose
// timestamp goes backwards are dropped so the result is always ordered.

use log::{trace, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

static LOG_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[[^\]]*\]\s*").expect("valid log prefix pattern"));

static FRAME_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^frame:\s*(\d+)\s+pts:\s*(\S+)\s+pts_time:\s*(\S+)")
        .expect("valid frame header pattern")
});

static VALUE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^lavfi\.([A-Za-z0-9_.]+)=(\S*)\s*$").expect("valid value line pattern")
});

/// One frame's worth of metadata. Keys have the `lavfi.` prefix removed.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataFrame {
    pub frame_index: u64,
    pub pts_time: f64,
    pub values: BTreeMap<String, f64>,
}

impl MetadataFrame {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }
}

/// What the parser had to skip or drop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    /// Lines that were neither a frame header nor a numeric `lavfi.` value.
    pub skipped_lines: usize,
    /// Frames dropped because their timestamp went backwards or was missing.
    pub dropped_frames: usize,
    /// Keys outside the expected prefixes.
    pub unknown_keys: BTreeSet<String>,
}

impl ParseDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.skipped_lines == 0 && self.dropped_frames == 0 && self.unknown_keys.is_empty()
    }

    pub fn merge(&mut self, other: &ParseDiagnostics) {
        self.skipped_lines += other.skipped_lines;
        self.dropped_frames += other.dropped_frames;
        self.unknown_keys.extend(other.unknown_keys.iter().cloned());
    }
}

/// Ordered frames plus diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ParsedMetadata {
    pub frames: Vec<MetadataFrame>,
    pub diagnostics: ParseDiagnostics,
}

enum Current {
    None,
    Frame(MetadataFrame),
    /// Header seen but the frame is being dropped; its values are ignored.
    Dropped,
}

fn finish(current: Current, out: &mut ParsedMetadata) {
    if let Current::Frame(frame) = current {
        out.frames.push(frame);
    }
}

/// Parses print-stage output.
///
/// `known_prefixes` lists the key prefixes (without `lavfi.`) the caller
/// understands, e.g. `["signalstats.", "scene_score"]`. An empty list
/// accepts every key.
pub fn parse_metadata(text: &str, known_prefixes: &[&str]) -> ParsedMetadata {
    let mut out = ParsedMetadata::default();
    let mut current = Current::None;
    let mut last_time: Option<f64> = None;

    for raw_line in text.lines() {
        let line = LOG_PREFIX.replace(raw_line.trim(), "");
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = FRAME_HEADER.captures(line) {
            finish(std::mem::replace(&mut current, Current::None), &mut out);

            let frame_index = caps[1].parse::<u64>().ok();
            let pts_time = caps[3].parse::<f64>().ok().filter(|t| t.is_finite());
            current = match (frame_index, pts_time) {
                (Some(frame_index), Some(pts_time)) => {
                    if last_time.is_some_and(|last| pts_time < last) {
                        trace!("Dropping frame {} at {} (time went backwards)", frame_index, pts_time);
                        out.diagnostics.dropped_frames += 1;
                        Current::Dropped
                    } else {
                        last_time = Some(pts_time);
                        Current::Frame(MetadataFrame {
                            frame_index,
                            pts_time,
                            values: BTreeMap::new(),
                        })
                    }
                }
                _ => {
                    trace!("Dropping frame without usable timestamp: {}", line);
                    out.diagnostics.dropped_frames += 1;
                    Current::Dropped
                }
            };
            continue;
        }

        let Some(caps) = VALUE_LINE.captures(line) else {
            trace!("Skipping unrecognised line: {}", line);
            out.diagnostics.skipped_lines += 1;
            continue;
        };

        let frame = match &mut current {
            Current::Frame(frame) => frame,
            Current::Dropped => continue,
            Current::None => {
                out.diagnostics.skipped_lines += 1;
                continue;
            }
        };

        let key = &caps[1];
        let Ok(value) = caps[2].parse::<f64>() else {
            out.diagnostics.skipped_lines += 1;
            continue;
        };
        if !value.is_finite() {
            // ebur128 reports -inf before the first gating block completes.
            continue;
        }

        let known = known_prefixes.is_empty() || known_prefixes.iter().any(|p| key.starts_with(p));
        if known {
            frame.values.insert(key.to_string(), value);
        } else {
            out.diagnostics.unknown_keys.insert(key.to_string());
        }
    }
    finish(current, &mut out);

    if !out.diagnostics.is_clean() {
        warn!(
            "Metadata parse: {} frames, {} skipped lines, {} dropped frames, {} unknown keys",
            out.frames.len(),
            out.diagnostics.skipped_lines,
            out.diagnostics.dropped_frames,
            out.diagnostics.unknown_keys.len()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_output() {
        let text = "\
frame:0    pts:0       pts_time:0
lavfi.signalstats.YAVG=40.5
lavfi.signalstats.YMIN=16
frame:1    pts:512     pts_time:0.04
lavfi.signalstats.YAVG=220
lavfi.scene_score=0.81
";
        let parsed = parse_metadata(text, &["signalstats.", "scene_score"]);
        assert_eq!(parsed.frames.len(), 2);
        assert_eq!(parsed.frames[0].get("signalstats.YAVG"), Some(40.5));
        assert_eq!(parsed.frames[1].pts_time, 0.04);
        assert_eq!(parsed.frames[1].get("scene_score"), Some(0.81));
        assert!(parsed.diagnostics.is_clean());
    }

    #[test]
    fn test_log_prefix_is_stripped() {
        let text = "\
[Parsed_metadata_1 @ 0x55d0c8a0] frame:3    pts:3       pts_time:0.12
[Parsed_metadata_1 @ 0x55d0c8a0] lavfi.blackframe.pblack=99
";
        let parsed = parse_metadata(text, &[]);
        assert_eq!(parsed.frames.len(), 1);
        assert_eq!(parsed.frames[0].frame_index, 3);
        assert_eq!(parsed.frames[0].get("blackframe.pblack"), Some(99.0));
    }

    #[test]
    fn test_malformed_lines_are_counted_not_fatal() {
        let text = "\
lavfi.signalstats.YAVG=10
frame:0 pts:0 pts_time:0
garbage here
lavfi.signalstats.YAVG=abc
lavfi.signalstats.YAVG=50
lavfi.mystery.KEY=3
";
        let parsed = parse_metadata(text, &["signalstats."]);
        assert_eq!(parsed.frames.len(), 1);
        assert_eq!(parsed.frames[0].get("signalstats.YAVG"), Some(50.0));
        // orphan value, garbage line, non-numeric value
        assert_eq!(parsed.diagnostics.skipped_lines, 3);
        assert!(parsed.diagnostics.unknown_keys.contains("mystery.KEY"));
    }

    #[test]
    fn test_backwards_and_missing_timestamps_dropped() {
        let text = "\
frame:0 pts:0 pts_time:1.0
lavfi.scene_score=0.1
frame:1 pts:0 pts_time:0.5
lavfi.scene_score=0.9
frame:2 pts:NOPTS pts_time:NOPTS
lavfi.scene_score=0.9
frame:3 pts:0 pts_time:1.0
lavfi.scene_score=0.2
";
        let parsed = parse_metadata(text, &[]);
        let times: Vec<f64> = parsed.frames.iter().map(|f| f.pts_time).collect();
        assert_eq!(times, vec![1.0, 1.0]);
        assert_eq!(parsed.diagnostics.dropped_frames, 2);
        assert_eq!(parsed.diagnostics.skipped_lines, 0);
    }

    #[test]
    fn test_negative_infinity_ignored() {
        let parsed = parse_metadata("frame:0 pts:0 pts_time:0\nlavfi.r128.I=-inf\n", &["r128."]);
        assert_eq!(parsed.frames.len(), 1);
        assert_eq!(parsed.frames[0].get("r128.I"), None);
        assert!(parsed.diagnostics.is_clean());
    }
}
