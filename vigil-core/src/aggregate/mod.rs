// ============================================================================
// vigil-core/src/aggregate/mod.rs
// ============================================================================
//
// RESULT AGGREGATOR: Sections In, Sealed Record Out
//
// Merges the per-category sections collected by the orchestrator into the
// record and seals it:
//
// 1. Sections are put in request order and every violation is gathered into
//    one list ordered by time.
// 2. Category risks are folded into the overall risk score and the violation
//    set is mapped onto the standards.
// 3. Every category that did not produce definitive data is listed as
//    degraded; the record is Completed only when that list is empty.
// 4. A validation report and the recommendation list are derived.

pub mod recommendations;
pub mod validation;

pub use recommendations::{Recommendation, recommend};
pub use validation::{ValidationLevel, ValidationMessage, ValidationReport};

use crate::category::Category;
use crate::config::ScoringConfig;
use crate::error::{CoreResult, ErrorKind};
use crate::record::{AnalysisRecord, CategorySection, DegradedCategory, RecordOutcome, RecordStatus};
use crate::scoring::{RiskScore, ViolationInstance, assess};
use crate::signal::Confidence;
use log::info;
use std::collections::BTreeMap;
use std::time::Duration;

fn degraded_entries(sections: &[CategorySection]) -> Vec<DegradedCategory> {
    sections
        .iter()
        .filter_map(|s| match (&s.error, s.confidence) {
            (Some(error), _) => Some(DegradedCategory {
                category: s.category,
                kind: Some(error.kind),
                confidence: Confidence::Unavailable,
                message: error.message.clone(),
            }),
            (None, Confidence::Definitive) => None,
            (None, confidence) => Some(DegradedCategory {
                category: s.category,
                kind: None,
                confidence,
                message: format!("{} result is {}", s.category, confidence),
            }),
        })
        .collect()
}

fn validate_sections(sections: &[CategorySection]) -> ValidationReport {
    let mut report = ValidationReport::new();
    for section in sections {
        let category = section.category.name();
        if let Some(error) = &section.error {
            report.add_error(format!("{}: {}", error.kind, error.message), category);
            continue;
        }
        if section.confidence == Confidence::Estimated {
            report.add_warning("result estimated from a proxy signal", category);
        }
        for diagnostic in &section.diagnostics {
            report.add_info(diagnostic.clone(), category);
        }
        if section.violations.is_empty() {
            report.add_info("no violations", category);
        } else {
            report.add_warning(format!("{} violation(s)", section.violations.len()), category);
        }
    }
    report
}

/// Fills in and seals `record`.
///
/// `categories` are the validated categories of the request; a category
/// without a section gets a degraded one.
pub fn finalize(
    record: &mut AnalysisRecord,
    mut sections: Vec<CategorySection>,
    categories: &[Category],
    config: &ScoringConfig,
) -> CoreResult<()> {
    record.ensure_open()?;

    for category in categories {
        if !sections.iter().any(|s| s.category == *category) {
            sections.push(CategorySection::degraded(
                *category,
                ErrorKind::Internal,
                "no section recorded",
                Duration::ZERO,
            ));
        }
    }

    let order = |c: Category| categories.iter().position(|x| *x == c).unwrap_or(usize::MAX);
    sections.sort_by_key(|s| order(s.category));

    let mut violations: Vec<ViolationInstance> = sections
        .iter()
        .flat_map(|s| s.violations.iter().cloned())
        .collect();
    violations.sort_by(|a, b| {
        a.window
            .start
            .total_cmp(&b.window.start)
            .then(a.kind.cmp(&b.kind))
    });

    let confidence: BTreeMap<Category, Confidence> = categories
        .iter()
        .map(|c| {
            let conf = sections
                .iter()
                .find(|s| s.category == *c)
                .map_or(Confidence::Unavailable, |s| s.confidence);
            (*c, conf)
        })
        .collect();

    let risks: Vec<(Category, f64, Confidence)> = sections
        .iter()
        .filter_map(|s| s.risk.map(|r| (s.category, r, s.confidence)))
        .collect();
    let risk = RiskScore::compute(&risks, config);
    let compliance = assess(&violations, &confidence, config);

    let degraded = degraded_entries(&sections);
    let validation = validate_sections(&sections);
    let recommendations = recommend(&violations, &degraded);

    let complete = confidence.values().all(|c| *c == Confidence::Definitive);
    let status = if complete {
        RecordStatus::Completed
    } else {
        RecordStatus::PartialFailure
    };

    info!(
        "Request {}: {} ({} violations, overall risk {:.1}, compliance {})",
        record.request_id(),
        status,
        violations.len(),
        risk.overall,
        compliance.overall
    );

    record.complete(
        RecordOutcome {
            sections,
            violations,
            risk,
            compliance,
            validation,
            recommendations,
            degraded,
        },
        status,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{TimeWindow, ViolationKind};
    use crate::record::AnalysisRequest;
    use crate::scoring::{ComplianceLevel, Severity, Standard};

    fn section(category: Category, confidence: Confidence, violations: Vec<ViolationInstance>) -> CategorySection {
        CategorySection {
            category,
            confidence,
            risk: Some(if violations.is_empty() { 0.0 } else { 75.0 }),
            metrics: None,
            violations,
            diagnostics: Vec::new(),
            error: None,
            elapsed_ms: 10,
        }
    }

    fn flash_violation(start: f64) -> ViolationInstance {
        ViolationInstance {
            category: Category::Flash,
            kind: ViolationKind::Flash,
            severity: Severity::High,
            window: TimeWindow::clamped(start, start + 1.0, 10.0),
            risk_score: 75.0,
            standards: Standard::covering(ViolationKind::Flash),
            detail: String::new(),
        }
    }

    fn running(categories: &[Category]) -> AnalysisRecord {
        let request = AnalysisRequest::new(
            "clip.mov",
            categories.iter().map(|c| c.name()),
            Duration::from_secs(10),
        );
        let mut record = AnalysisRecord::new(&request);
        record.start().unwrap();
        record
    }

    #[test]
    fn test_all_definitive_completes() {
        let categories = [Category::Flash, Category::Loudness];
        let mut record = running(&categories);
        let sections = vec![
            section(Category::Loudness, Confidence::Definitive, Vec::new()),
            section(
                Category::Flash,
                Confidence::Definitive,
                vec![flash_violation(4.0), flash_violation(1.0)],
            ),
        ];
        finalize(&mut record, sections, &categories, &ScoringConfig::default()).unwrap();

        assert_eq!(record.status(), RecordStatus::Completed);
        assert_eq!(record.sections()[0].category, Category::Flash);
        assert_eq!(record.violations()[0].window.start, 1.0);
        assert_eq!(record.compliance().overall, ComplianceLevel::NonCompliant);
        assert!(record.degraded().is_empty());
        assert!(!record.recommendations().is_empty());
        assert!(record.is_sealed());
    }

    #[test]
    fn test_degraded_and_estimated_are_partial() {
        let categories = [Category::Flash, Category::SceneCuts, Category::Loudness];
        let mut record = running(&categories);
        let sections = vec![
            section(Category::Flash, Confidence::Estimated, Vec::new()),
            CategorySection::degraded(
                Category::Loudness,
                ErrorKind::ToolTimeout,
                "ffmpeg exceeded its deadline",
                Duration::from_secs(2),
            ),
        ];
        finalize(&mut record, sections, &categories, &ScoringConfig::default()).unwrap();

        assert_eq!(record.status(), RecordStatus::PartialFailure);
        assert_eq!(record.degraded().len(), 3);
        assert!(record.is_degraded(Category::SceneCuts));
        assert!(record.is_degraded(Category::Loudness));
        assert!(record.is_degraded(Category::Flash));
        assert!(!record.validation().passed);
        assert_eq!(
            record.compliance().get(Standard::EbuR128).unwrap().level,
            ComplianceLevel::NotAssessed
        );
        assert!(record.risk().accuracy < ScoringConfig::default().analysis_accuracy);
    }
}
