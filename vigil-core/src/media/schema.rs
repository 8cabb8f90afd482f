//! Typed schema of the ffprobe JSON document.
//!
//! Only the fields the engine reads are typed. Everything else lands in the
//! `unexpected` maps; fields ffprobe is known to emit are ignored, any other
//! field is reported as a diagnostic so schema drift is visible instead of
//! silently dropped.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Stream fields ffprobe emits that the engine deliberately ignores.
const KNOWN_STREAM_FIELDS: &[&str] = &[
    "codec_long_name",
    "profile",
    "codec_tag_string",
    "codec_tag",
    "coded_width",
    "coded_height",
    "closed_captions",
    "film_grain",
    "has_b_frames",
    "level",
    "color_range",
    "color_space",
    "color_transfer",
    "color_primaries",
    "chroma_location",
    "refs",
    "is_avc",
    "nal_length_size",
    "id",
    "time_base",
    "start_pts",
    "start_time",
    "duration_ts",
    "bit_rate",
    "max_bit_rate",
    "bits_per_sample",
    "nb_frames",
    "nb_read_frames",
    "nb_read_packets",
    "extradata_size",
    "disposition",
    "tags",
    "sample_fmt",
    "channel_layout",
    "initial_padding",
    "side_data_list",
];

const KNOWN_FORMAT_FIELDS: &[&str] = &[
    "filename",
    "nb_streams",
    "nb_programs",
    "nb_stream_groups",
    "format_long_name",
    "start_time",
    "size",
    "bit_rate",
    "probe_score",
    "tags",
];

const KNOWN_TOP_LEVEL_FIELDS: &[&str] = &["programs", "stream_groups", "chapters"];

/// Root of `ffprobe -print_format json -show_format -show_streams`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeDocument {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    #[serde(default)]
    pub format: Option<ProbeFormat>,
    #[serde(flatten)]
    pub unexpected: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeStream {
    #[serde(default)]
    pub index: u32,
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pix_fmt: Option<String>,
    pub bits_per_raw_sample: Option<String>,
    pub r_frame_rate: Option<String>,
    pub avg_frame_rate: Option<String>,
    pub field_order: Option<String>,
    pub sample_aspect_ratio: Option<String>,
    pub display_aspect_ratio: Option<String>,
    pub sample_rate: Option<String>,
    pub channels: Option<u32>,
    pub duration: Option<String>,
    #[serde(flatten)]
    pub unexpected: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeFormat {
    pub format_name: Option<String>,
    pub duration: Option<String>,
    #[serde(flatten)]
    pub unexpected: BTreeMap<String, Value>,
}

fn collect_unknown(
    out: &mut Vec<String>,
    prefix: &str,
    fields: &BTreeMap<String, Value>,
    known: &[&str],
) {
    for key in fields.keys().filter(|k| !known.contains(&k.as_str())) {
        if prefix.is_empty() {
            out.push(format!("unknown field {}", key));
        } else {
            out.push(format!("unknown field {}.{}", prefix, key));
        }
    }
}

impl ProbeDocument {
    /// Names of fields neither typed nor known to be irrelevant.
    pub fn unknown_field_diagnostics(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_unknown(&mut out, "", &self.unexpected, KNOWN_TOP_LEVEL_FIELDS);
        if let Some(format) = &self.format {
            collect_unknown(&mut out, "format", &format.unexpected, KNOWN_FORMAT_FIELDS);
        }
        for stream in &self.streams {
            let prefix = format!("streams[{}]", stream.index);
            collect_unknown(&mut out, &prefix, &stream.unexpected, KNOWN_STREAM_FIELDS);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_reported() {
        let doc: ProbeDocument = serde_json::from_str(
            r#"{
                "streams": [{"index": 0, "codec_type": "video", "profile": "Main", "hdr_magic": 1}],
                "format": {"duration": "10.0", "size": "1000", "vendor_blob": "x"},
                "chapters": [],
                "surprise": true
            }"#,
        )
        .unwrap();

        let diags = doc.unknown_field_diagnostics();
        assert!(diags.contains(&"unknown field streams[0].hdr_magic".to_string()));
        assert!(diags.contains(&"unknown field format.vendor_blob".to_string()));
        assert!(diags.contains(&"unknown field surprise".to_string()));
        assert_eq!(diags.len(), 3);
    }
}
