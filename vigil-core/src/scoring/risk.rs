//! Category and overall risk.

use super::ViolationInstance;
use super::severity::Severity;
use crate::category::Category;
use crate::config::ScoringConfig;
use crate::signal::Confidence;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Points added per violation beyond the first.
const EXTRA_VIOLATION_POINTS: f64 = 2.0;
const MAX_EXTRA_VIOLATION_POINTS: f64 = 10.0;
/// Points added for perfectly regular violating events.
const REGULARITY_POINTS: f64 = 10.0;

/// Risk of one category, 0-100.
///
/// Starts from the base score of the worst severity seen (the rate-derived
/// one for rate categories, or any violation's). Regular event patterns and
/// repeated violations add to it.
pub fn category_risk(
    rate_severity: Option<Severity>,
    violations: &[ViolationInstance],
    regularity: Option<f64>,
) -> f64 {
    let worst = violations
        .iter()
        .map(|v| v.severity)
        .chain(rate_severity)
        .max()
        .unwrap_or(Severity::Safe);

    let mut risk = worst.base_risk();
    if !violations.is_empty() {
        if let Some(regularity) = regularity.filter(|r| r.is_finite()) {
            risk += REGULARITY_POINTS * regularity.clamp(0.0, 1.0);
        }
        let extra = (violations.len() - 1) as f64 * EXTRA_VIOLATION_POINTS;
        risk += extra.min(MAX_EXTRA_VIOLATION_POINTS);
    }
    risk.clamp(0.0, 100.0)
}

/// Overall risk of a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// `max_weight * max + avg_weight * avg` over categories with data.
    pub overall: f64,
    pub max_category: f64,
    pub average_category: f64,
    pub severity: Severity,
    /// Accuracy of the analysis; reduced when any category is an estimate.
    pub accuracy: f64,
    pub per_category: BTreeMap<Category, f64>,
}

impl RiskScore {
    /// Folds category risks into the overall score. Categories whose
    /// confidence is `Unavailable` produced no data and are left out.
    pub fn compute(risks: &[(Category, f64, Confidence)], config: &ScoringConfig) -> Self {
        let scored: Vec<(Category, f64, Confidence)> = risks
            .iter()
            .copied()
            .filter(|(_, _, confidence)| *confidence != Confidence::Unavailable)
            .collect();
        if scored.is_empty() {
            return Self::default();
        }

        let max = scored.iter().map(|(_, r, _)| *r).fold(0.0, f64::max);
        let avg = scored.iter().map(|(_, r, _)| *r).sum::<f64>() / scored.len() as f64;
        let overall = (config.max_weight * max + config.avg_weight * avg).clamp(0.0, 100.0);

        let estimated = scored.iter().any(|(_, _, c)| *c == Confidence::Estimated);
        let accuracy = if estimated {
            config.analysis_accuracy * config.estimated_confidence
        } else {
            config.analysis_accuracy
        };

        Self {
            overall,
            max_category: max,
            average_category: avg,
            severity: overall_severity(overall),
            accuracy,
            per_category: scored.iter().map(|(c, r, _)| (*c, *r)).collect(),
        }
    }
}

/// Maps an overall score back onto the severity buckets by base score.
fn overall_severity(score: f64) -> Severity {
    [
        Severity::Extreme,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ]
    .into_iter()
    .find(|s| score >= s.base_risk())
    .unwrap_or(Severity::Safe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{TimeWindow, ViolationKind};

    fn violation(severity: Severity) -> ViolationInstance {
        ViolationInstance {
            category: Category::Flash,
            kind: ViolationKind::Flash,
            severity,
            window: TimeWindow::whole(1.0),
            risk_score: severity.base_risk(),
            standards: Vec::new(),
            detail: String::new(),
        }
    }

    #[test]
    fn test_category_risk() {
        assert_eq!(category_risk(None, &[], None), 0.0);
        assert_eq!(category_risk(Some(Severity::Low), &[], Some(1.0)), 20.0);

        let one = [violation(Severity::High)];
        assert_eq!(category_risk(Some(Severity::High), &one, Some(1.0)), 85.0);

        let many: Vec<_> = (0..10).map(|_| violation(Severity::Extreme)).collect();
        assert_eq!(category_risk(None, &many, Some(1.0)), 100.0);
    }

    #[test]
    fn test_overall_weighting_skips_unavailable() {
        let config = ScoringConfig::default();
        let score = RiskScore::compute(
            &[
                (Category::Flash, 80.0, Confidence::Definitive),
                (Category::Loudness, 20.0, Confidence::Definitive),
                (Category::SceneCuts, 100.0, Confidence::Unavailable),
            ],
            &config,
        );
        assert!((score.overall - (0.7 * 80.0 + 0.3 * 50.0)).abs() < 1e-9);
        assert_eq!(score.per_category.len(), 2);
        assert_eq!(score.accuracy, config.analysis_accuracy);
        assert_eq!(score.severity, Severity::Medium);
    }

    #[test]
    fn test_estimated_lowers_accuracy() {
        let config = ScoringConfig::default();
        let score = RiskScore::compute(&[(Category::Flash, 10.0, Confidence::Estimated)], &config);
        assert!((score.accuracy - config.analysis_accuracy * config.estimated_confidence).abs() < 1e-12);
    }

    #[test]
    fn test_no_data_is_zero() {
        let score = RiskScore::compute(&[], &ScoringConfig::default());
        assert_eq!(score, RiskScore::default());
    }
}
