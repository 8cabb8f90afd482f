//! Risk scoring and compliance mapping
//!
//! Turns detector findings into violation instances with a severity, a risk
//! score and the standards they affect, folds category risks into an overall
//! risk score, and maps the violation set onto per-standard verdicts.
//!
//! Everything here is a pure function of its inputs and the
//! [`ScoringConfig`](crate::config::ScoringConfig).

pub mod compliance;
pub mod risk;
pub mod severity;

pub use compliance::{ComplianceLevel, ComplianceReport, Standard, StandardCompliance, assess};
pub use risk::{RiskScore, category_risk};
pub use severity::Severity;

use crate::category::Category;
use crate::config::EngineConfig;
use crate::detection::{Finding, TimeWindow, ViolationKind};
use serde::{Deserialize, Serialize};

/// A recorded breach scoped to a time window and mapped to named standards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationInstance {
    pub category: Category,
    pub kind: ViolationKind,
    pub severity: Severity,
    pub window: TimeWindow,
    /// 0-100
    pub risk_score: f64,
    pub standards: Vec<Standard>,
    pub detail: String,
}

fn window_for(kind: ViolationKind, config: &EngineConfig) -> f64 {
    match kind {
        ViolationKind::RapidCuts => config.scene.window_secs,
        _ => config.flash.window_secs,
    }
}

/// Scores the findings of one category.
pub fn violations_for(
    category: Category,
    findings: &[Finding],
    config: &EngineConfig,
) -> Vec<ViolationInstance> {
    findings
        .iter()
        .map(|finding| {
            let severity = severity::classify(
                finding,
                window_for(finding.kind, config),
                config.black.max_black_secs,
            );
            ViolationInstance {
                category,
                kind: finding.kind,
                severity,
                window: finding.window,
                risk_score: severity.base_risk(),
                standards: Standard::covering(finding.kind),
                detail: finding.detail.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violations_carry_standards() {
        let config = EngineConfig::default();
        let findings = [Finding::new(
            ViolationKind::RedFlash,
            TimeWindow::clamped(0.5, 1.5, 10.0),
            4.0,
            "4 saturated red flashes",
        )];
        let violations = violations_for(Category::Flash, &findings, &config);

        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.severity, Severity::High);
        assert_eq!(v.risk_score, 75.0);
        assert_eq!(
            v.standards,
            vec![Standard::ItuBt1702, Standard::Ofcom, Standard::Wcag231]
        );
    }
}
