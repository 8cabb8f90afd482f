// ============================================================================
// vigil-core/src/scoring/compliance.rs
// ============================================================================
//
// COMPLIANCE MAPPER: Violations to Per-Standard Verdicts
//
// Every standard starts at 100 and loses the configured penalty for each
// violation it covers. The score maps to a level:
//
//   score >= full_threshold     -> Full
//   score >= partial_threshold  -> Partial
//   otherwise                   -> NonCompliant
//
// Flash and red-flash violations breach the hard 3-per-second limit of the
// photosensitivity standards, which makes those standards NonCompliant
// whatever their score. A standard whose required category produced no data
// is NotAssessed, and standards whose required category was not requested
// are left out of the report.

use super::ViolationInstance;
use crate::category::Category;
use crate::config::ScoringConfig;
use crate::detection::ViolationKind;
use crate::signal::Confidence;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A named standard or delivery profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standard {
    ItuBt1702,
    Ofcom,
    Wcag231,
    EbuR128,
    AtscA85,
    SmpteSt2016,
    BroadcastDelivery,
}

impl Standard {
    pub const ALL: [Standard; 7] = [
        Standard::ItuBt1702,
        Standard::Ofcom,
        Standard::Wcag231,
        Standard::EbuR128,
        Standard::AtscA85,
        Standard::SmpteSt2016,
        Standard::BroadcastDelivery,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Standard::ItuBt1702 => "ITU-R BT.1702",
            Standard::Ofcom => "Ofcom Broadcasting Code (2.12)",
            Standard::Wcag231 => "WCAG 2.1 SC 2.3.1",
            Standard::EbuR128 => "EBU R128",
            Standard::AtscA85 => "ATSC A/85",
            Standard::SmpteSt2016 => "SMPTE ST 2016-1",
            Standard::BroadcastDelivery => "Broadcast delivery profile",
        }
    }

    /// The category without which the standard cannot be assessed.
    pub fn required_category(self) -> Category {
        match self {
            Standard::ItuBt1702 | Standard::Ofcom | Standard::Wcag231 => Category::Flash,
            Standard::EbuR128 | Standard::AtscA85 => Category::Loudness,
            Standard::SmpteSt2016 => Category::AspectRatio,
            Standard::BroadcastDelivery => Category::StreamFormat,
        }
    }

    pub fn covers(self, kind: ViolationKind) -> bool {
        use ViolationKind::*;
        match self {
            Standard::ItuBt1702 | Standard::Wcag231 => matches!(kind, Flash | RedFlash),
            Standard::Ofcom => matches!(kind, Flash | RedFlash | RapidCuts),
            Standard::EbuR128 => kind == LoudnessEbuR128,
            Standard::AtscA85 => kind == LoudnessAtscA85,
            Standard::SmpteSt2016 => kind == AspectRatio,
            Standard::BroadcastDelivery => matches!(kind, Format | BlackSegment),
        }
    }

    /// Whether a violation of `kind` breaches a hard limit of this standard.
    pub fn is_hard_limit(self, kind: ViolationKind) -> bool {
        self.covers(kind) && matches!(kind, ViolationKind::Flash | ViolationKind::RedFlash)
    }

    /// Standards covering `kind`.
    pub fn covering(kind: ViolationKind) -> Vec<Standard> {
        Standard::ALL.into_iter().filter(|s| s.covers(kind)).collect()
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceLevel {
    Full,
    Partial,
    NonCompliant,
    NotAssessed,
}

impl ComplianceLevel {
    /// Ordering used for the overall verdict; higher is worse. An unassessed
    /// standard ranks below a known breach but above any passing level.
    fn rank(self) -> u8 {
        match self {
            ComplianceLevel::Full => 0,
            ComplianceLevel::Partial => 1,
            ComplianceLevel::NotAssessed => 2,
            ComplianceLevel::NonCompliant => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComplianceLevel::Full => "full",
            ComplianceLevel::Partial => "partial",
            ComplianceLevel::NonCompliant => "non_compliant",
            ComplianceLevel::NotAssessed => "not_assessed",
        }
    }
}

impl fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one standard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardCompliance {
    pub standard: Standard,
    pub level: ComplianceLevel,
    /// `None` when the standard was not assessed.
    pub score: Option<f64>,
    pub violation_count: usize,
    pub hard_limit_exceeded: bool,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub overall: ComplianceLevel,
    pub standards: Vec<StandardCompliance>,
}

impl Default for ComplianceReport {
    fn default() -> Self {
        Self {
            overall: ComplianceLevel::NotAssessed,
            standards: Vec::new(),
        }
    }
}

impl ComplianceReport {
    pub fn get(&self, standard: Standard) -> Option<&StandardCompliance> {
        self.standards.iter().find(|s| s.standard == standard)
    }
}

/// Points deducted for one violation of `kind`.
pub fn penalty(kind: ViolationKind, config: &ScoringConfig) -> f64 {
    match kind {
        ViolationKind::Flash => config.flash_penalty,
        ViolationKind::RedFlash => config.red_flash_penalty,
        ViolationKind::RapidCuts => config.rapid_cuts_penalty,
        ViolationKind::BlackSegment => config.black_segment_penalty,
        ViolationKind::LoudnessEbuR128 | ViolationKind::LoudnessAtscA85 => config.loudness_penalty,
        ViolationKind::AspectRatio => config.aspect_ratio_penalty,
        ViolationKind::Format => config.format_penalty,
    }
}

fn level_for(score: f64, config: &ScoringConfig) -> ComplianceLevel {
    if score >= config.full_threshold {
        ComplianceLevel::Full
    } else if score >= config.partial_threshold {
        ComplianceLevel::Partial
    } else {
        ComplianceLevel::NonCompliant
    }
}

/// Maps the violation set onto every standard whose required category was
/// requested. `confidence` holds one entry per requested category.
pub fn assess(
    violations: &[ViolationInstance],
    confidence: &BTreeMap<Category, Confidence>,
    config: &ScoringConfig,
) -> ComplianceReport {
    let mut standards = Vec::new();

    for standard in Standard::ALL {
        let Some(&category_confidence) = confidence.get(&standard.required_category()) else {
            continue;
        };

        if category_confidence == Confidence::Unavailable {
            standards.push(StandardCompliance {
                standard,
                level: ComplianceLevel::NotAssessed,
                score: None,
                violation_count: 0,
                hard_limit_exceeded: false,
                confidence: Confidence::Unavailable,
            });
            continue;
        }

        let relevant: Vec<&ViolationInstance> =
            violations.iter().filter(|v| standard.covers(v.kind)).collect();
        let deducted: f64 = relevant.iter().map(|v| penalty(v.kind, config)).sum();
        let score = (100.0 - deducted).max(0.0);
        let hard_limit_exceeded = relevant.iter().any(|v| standard.is_hard_limit(v.kind));

        let level = if hard_limit_exceeded {
            ComplianceLevel::NonCompliant
        } else {
            level_for(score, config)
        };

        standards.push(StandardCompliance {
            standard,
            level,
            score: Some(score),
            violation_count: relevant.len(),
            hard_limit_exceeded,
            confidence: category_confidence,
        });
    }

    let overall = standards
        .iter()
        .map(|s| s.level)
        .max_by_key(|level| level.rank())
        .unwrap_or(ComplianceLevel::NotAssessed);

    ComplianceReport { overall, standards }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::TimeWindow;
    use crate::scoring::Severity;

    fn violation(category: Category, kind: ViolationKind) -> ViolationInstance {
        ViolationInstance {
            category,
            kind,
            severity: Severity::High,
            window: TimeWindow::whole(10.0),
            risk_score: 75.0,
            standards: Standard::covering(kind),
            detail: String::new(),
        }
    }

    fn definitive(categories: &[Category]) -> BTreeMap<Category, Confidence> {
        categories.iter().map(|c| (*c, Confidence::Definitive)).collect()
    }

    #[test]
    fn test_flash_breach_is_non_compliant_despite_score() {
        let config = ScoringConfig::default();
        let violations = [violation(Category::Flash, ViolationKind::Flash)];
        let report = assess(&violations, &definitive(&[Category::Flash]), &config);

        assert_eq!(report.standards.len(), 3);
        let bt1702 = report.get(Standard::ItuBt1702).unwrap();
        assert_eq!(bt1702.score, Some(80.0));
        assert!(bt1702.hard_limit_exceeded);
        assert_eq!(bt1702.level, ComplianceLevel::NonCompliant);
        assert_eq!(report.overall, ComplianceLevel::NonCompliant);
    }

    #[test]
    fn test_penalty_levels() {
        let config = ScoringConfig::default();
        let categories = definitive(&[Category::StreamFormat, Category::BlackFrames]);

        let one = [violation(Category::StreamFormat, ViolationKind::Format)];
        let report = assess(&one, &categories, &config);
        assert_eq!(report.get(Standard::BroadcastDelivery).unwrap().level, ComplianceLevel::Full);

        let three = [
            violation(Category::StreamFormat, ViolationKind::Format),
            violation(Category::StreamFormat, ViolationKind::Format),
            violation(Category::BlackFrames, ViolationKind::BlackSegment),
        ];
        let report = assess(&three, &categories, &config);
        let delivery = report.get(Standard::BroadcastDelivery).unwrap();
        assert_eq!(delivery.score, Some(75.0));
        assert_eq!(delivery.level, ComplianceLevel::Partial);
    }

    #[test]
    fn test_unavailable_category_is_not_assessed() {
        let config = ScoringConfig::default();
        let mut confidence = definitive(&[Category::Loudness]);
        confidence.insert(Category::Flash, Confidence::Unavailable);

        let report = assess(&[], &confidence, &config);
        assert_eq!(report.get(Standard::Ofcom).unwrap().level, ComplianceLevel::NotAssessed);
        assert_eq!(report.get(Standard::EbuR128).unwrap().level, ComplianceLevel::Full);
        assert!(report.get(Standard::SmpteSt2016).is_none());
        assert_eq!(report.overall, ComplianceLevel::NotAssessed);
    }

    #[test]
    fn test_estimated_confidence_carried() {
        let config = ScoringConfig::default();
        let mut confidence = BTreeMap::new();
        confidence.insert(Category::Flash, Confidence::Estimated);
        let report = assess(&[], &confidence, &config);
        assert!(report.standards.iter().all(|s| s.confidence == Confidence::Estimated));
        assert_eq!(report.overall, ComplianceLevel::Full);
    }
}
