//! Descriptor checks
//!
//! Responsibilities:
//! - Check display aspect ratio signalling against the coded raster
//! - Check the display aspect ratio against broadcast-safe ratios
//! - Check frame rate, pixel format and raster against the delivery profile
//!
//! These checks read the stream descriptor only. A finding covers the whole
//! duration because the descriptor describes the whole stream.

use super::{Finding, TimeWindow, ViolationKind};
use crate::config::FormatConfig;
use crate::error::{CoreError, CoreResult};
use crate::media::{Ratio, StreamDescriptor, VideoDescriptor};
use log::debug;

fn video(descriptor: &StreamDescriptor) -> CoreResult<&VideoDescriptor> {
    descriptor
        .video
        .as_ref()
        .ok_or_else(|| CoreError::MalformedOutput("no video stream in descriptor".to_string()))
}

fn relative_deviation(actual: f64, expected: f64) -> f64 {
    (actual - expected).abs() / expected
}

/// Display aspect ratio implied by the raster and the sample aspect ratio.
/// A missing SAR is taken as square pixels.
pub fn computed_display_aspect(video: &VideoDescriptor) -> Option<f64> {
    let (width, height) = (video.width?, video.height?);
    let sar = video.sample_aspect_ratio.unwrap_or(Ratio::new(1, 1));
    Some(width as f64 * sar.value() / height as f64)
}

/// Aspect ratio signalling checks.
///
/// Fails with `MalformedOutput` when neither a signalled display aspect
/// ratio nor a raster is known.
pub fn check_aspect_ratio(descriptor: &StreamDescriptor, config: &FormatConfig) -> CoreResult<Vec<Finding>> {
    let video = video(descriptor)?;
    let window = TimeWindow::whole(descriptor.duration_secs);
    let tolerance = config.aspect_tolerance_pct / 100.0;
    let computed = computed_display_aspect(video);
    let signalled = video.display_aspect_ratio;

    let effective = match (signalled, computed) {
        (Some(dar), _) => dar.value(),
        (None, Some(c)) => c,
        (None, None) => {
            return Err(CoreError::MalformedOutput(
                "display aspect ratio cannot be determined".to_string(),
            ));
        }
    };

    let mut findings = Vec::new();
    match (signalled, computed) {
        (None, Some(c)) => findings.push(Finding::new(
            ViolationKind::AspectRatio,
            window,
            1.0,
            format!("display aspect ratio not signalled (raster implies {:.4})", c),
        )),
        (Some(dar), Some(c)) => {
            let deviation = relative_deviation(dar.value(), c);
            if deviation > tolerance {
                findings.push(Finding::new(
                    ViolationKind::AspectRatio,
                    window,
                    deviation,
                    format!(
                        "signalled display aspect ratio {} disagrees with raster ({:.4}) by {:.1}%",
                        dar,
                        c,
                        deviation * 100.0
                    ),
                ));
            }
        }
        _ => {}
    }

    let nearest = config
        .broadcast_aspect_ratios
        .iter()
        .filter(|[num, den]| *num > 0 && *den > 0)
        .map(|&[num, den]| (Ratio::new(num, den), relative_deviation(effective, num as f64 / den as f64)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((ratio, deviation)) = nearest {
        if deviation > tolerance {
            findings.push(Finding::new(
                ViolationKind::AspectRatio,
                window,
                deviation,
                format!(
                    "display aspect ratio {:.4} is not broadcast-safe (nearest {} is {:.1}% away)",
                    effective,
                    ratio,
                    deviation * 100.0
                ),
            ));
        }
    }

    debug!("Aspect ratio check: effective {:.4}, {} findings", effective, findings.len());
    Ok(findings)
}

/// Delivery profile checks: frame rate, pixel format and raster.
pub fn check_stream_format(descriptor: &StreamDescriptor, config: &FormatConfig) -> CoreResult<Vec<Finding>> {
    let video = video(descriptor)?;
    let window = TimeWindow::whole(descriptor.duration_secs);
    let mut findings = Vec::new();

    match video.frame_rate {
        Some(rate) => {
            let deviation = config
                .allowed_frame_rates
                .iter()
                .filter(|a| **a > 0.0)
                .map(|a| relative_deviation(rate, *a))
                .fold(f64::INFINITY, f64::min);
            if deviation > config.frame_rate_tolerance {
                findings.push(Finding::new(
                    ViolationKind::Format,
                    window,
                    deviation.min(1.0),
                    format!("frame rate {:.3} fps is not a broadcast rate", rate),
                ));
            }
        }
        None => findings.push(Finding::new(
            ViolationKind::Format,
            window,
            1.0,
            "frame rate not signalled",
        )),
    }

    match video.pix_fmt.as_deref() {
        Some(pix_fmt) if config.allowed_pixel_formats.iter().any(|p| p == pix_fmt) => {}
        Some(pix_fmt) => findings.push(Finding::new(
            ViolationKind::Format,
            window,
            1.0,
            format!("pixel format '{}' is not in the delivery profile", pix_fmt),
        )),
        None => findings.push(Finding::new(
            ViolationKind::Format,
            window,
            1.0,
            "pixel format not signalled",
        )),
    }

    match (video.width, video.height) {
        (Some(w), Some(h)) if config.allowed_resolutions.contains(&[w, h]) => {}
        (Some(w), Some(h)) => findings.push(Finding::new(
            ViolationKind::Format,
            window,
            1.0,
            format!("raster {}x{} is not in the delivery profile", w, h),
        )),
        _ => findings.push(Finding::new(
            ViolationKind::Format,
            window,
            1.0,
            "raster not signalled",
        )),
    }

    debug!("Stream format check: {} findings", findings.len());
    Ok(findings)
}
