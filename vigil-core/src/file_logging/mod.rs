pub mod setup;

pub use setup::{log_file_path, setup_file_logging};

use crate::record::{AnalysisRecord, RecordStatus};
use log::{error, info, warn};

/// Writes the outcome of a finished request to the log, one line per fact,
/// so the file log stays readable without the JSON record.
pub fn log_record(record: &AnalysisRecord) {
    info!("Analysis {} of {}", record.request_id(), record.source().display());
    info!("  Status: {}", record.status());

    if let Some(failure) = record.failure() {
        error!("  Failure: {} ({})", failure.message, failure.kind);
        return;
    }

    if let Some(descriptor) = record.descriptor() {
        info!(
            "  Duration: {:.2}s, container: {}",
            descriptor.duration_secs,
            descriptor.container.as_deref().unwrap_or("unknown")
        );
    }

    for section in record.sections() {
        match &section.error {
            Some(err) => warn!(
                "  {}: degraded ({}) after {} ms: {}",
                section.category, err.kind, section.elapsed_ms, err.message
            ),
            None => info!(
                "  {}: {} violation(s), risk {:.1}, {} in {} ms",
                section.category,
                section.violations.len(),
                section.risk.unwrap_or(0.0),
                section.confidence,
                section.elapsed_ms
            ),
        }
    }

    info!(
        "  Risk: overall {:.1} ({}), accuracy {:.2}",
        record.risk().overall, record.risk().severity, record.risk().accuracy
    );
    for standard in &record.compliance().standards {
        info!(
            "  {}: {} (score {})",
            standard.standard,
            standard.level,
            standard
                .score
                .map_or_else(|| "n/a".to_string(), |s| format!("{:.0}", s))
        );
    }
    for rec in record.recommendations() {
        info!("  Recommendation [{}] {}", rec.priority, rec.message);
    }

    if record.status() == RecordStatus::PartialFailure {
        warn!(
            "  {} categor(ies) did not complete at full confidence",
            record.degraded().len()
        );
    }
}
