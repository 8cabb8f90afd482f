//! Recommendations derived from violations and degraded categories.
//!
//! One recommendation per violation kind, carrying the worst severity seen
//! for that kind, plus one per safety-critical category that could not be
//! fully analysed. Duplicates are removed and the list is ordered by
//! priority, highest first.

use crate::category::Category;
use crate::detection::ViolationKind;
use crate::record::DegradedCategory;
use crate::scoring::{Severity, ViolationInstance};
use crate::signal::Confidence;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Severity,
    pub category: Category,
    pub message: String,
}

fn advice(kind: ViolationKind) -> &'static str {
    match kind {
        ViolationKind::Flash => {
            "Reduce flashing to fewer than 3 transitions per second or lower the luminance change"
        }
        ViolationKind::RedFlash => "Remove or desaturate flashing saturated red content",
        ViolationKind::RapidCuts => "Lengthen shots in the rapid cutting sequences",
        ViolationKind::BlackSegment => "Trim or fill overlong black segments",
        ViolationKind::LoudnessEbuR128 => "Normalise programme loudness to -23 LUFS (EBU R128)",
        ViolationKind::LoudnessAtscA85 => "Normalise programme loudness to -24 LKFS (ATSC A/85)",
        ViolationKind::AspectRatio => "Correct display aspect ratio signalling",
        ViolationKind::Format => "Conform frame rate, raster and pixel format to the delivery profile",
    }
}

pub fn recommend(
    violations: &[ViolationInstance],
    degraded: &[DegradedCategory],
) -> Vec<Recommendation> {
    let mut worst: BTreeMap<ViolationKind, (Severity, Category, usize)> = BTreeMap::new();
    for v in violations {
        let entry = worst.entry(v.kind).or_insert((v.severity, v.category, 0));
        entry.0 = entry.0.max(v.severity);
        entry.2 += 1;
    }

    let mut out: Vec<Recommendation> = worst
        .into_iter()
        .map(|(kind, (priority, category, count))| Recommendation {
            priority,
            category,
            message: format!("{} ({} violation(s))", advice(kind), count),
        })
        .collect();

    for d in degraded.iter().filter(|d| d.category.is_safety_critical()) {
        let (priority, message) = if d.confidence == Confidence::Estimated {
            (
                Severity::Medium,
                format!(
                    "{} result is an estimate; re-run with full luminance statistics before clearing",
                    d.category
                ),
            )
        } else {
            (
                Severity::High,
                format!(
                    "{} analysis unavailable; do not clear for broadcast until it has been re-run",
                    d.category
                ),
            )
        };
        out.push(Recommendation {
            priority,
            category: d.category,
            message,
        });
    }

    let mut seen = HashSet::new();
    out.retain(|r| seen.insert(r.message.clone()));
    // Stable: ties keep kind order.
    out.sort_by(|a, b| b.priority.cmp(&a.priority));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::TimeWindow;
    use crate::error::ErrorKind;
    use crate::scoring::Standard;

    fn violation(kind: ViolationKind, severity: Severity) -> ViolationInstance {
        ViolationInstance {
            category: Category::Flash,
            kind,
            severity,
            window: TimeWindow::whole(5.0),
            risk_score: severity.base_risk(),
            standards: Standard::covering(kind),
            detail: String::new(),
        }
    }

    #[test]
    fn test_one_per_kind_ordered_by_priority() {
        let violations = [
            violation(ViolationKind::Format, Severity::Medium),
            violation(ViolationKind::Flash, Severity::High),
            violation(ViolationKind::Flash, Severity::Extreme),
            violation(ViolationKind::Format, Severity::Medium),
        ];
        let recs = recommend(&violations, &[]);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].priority, Severity::Extreme);
        assert!(recs[0].message.contains("(2 violation(s))"));
        assert_eq!(recs[1].priority, Severity::Medium);
    }

    #[test]
    fn test_degraded_safety_category_is_flagged() {
        let degraded = [
            DegradedCategory {
                category: Category::Flash,
                kind: Some(ErrorKind::ToolTimeout),
                confidence: Confidence::Unavailable,
                message: "timed out".to_string(),
            },
            DegradedCategory {
                category: Category::Loudness,
                kind: Some(ErrorKind::ToolTimeout),
                confidence: Confidence::Unavailable,
                message: "timed out".to_string(),
            },
        ];
        let recs = recommend(&[], &degraded);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, Category::Flash);
        assert_eq!(recs[0].priority, Severity::High);
    }
}
