// ============================================================================
// vigil-core/src/record.rs
// ============================================================================
//
// RECORD MODEL: Requests In, Sealed Analysis Records Out
//
// LIFECYCLE:
//   Pending -> Running -> { Completed | PartialFailure | Failed }
//
// A record is sealed once it reaches a terminal status. Every mutation goes
// through a method that refuses to act on a sealed record, so a finished
// record can be handed to sinks and callers without further changes.

use crate::aggregate::{Recommendation, ValidationReport};
use crate::analyzers::{CategoryMetrics, CategoryOutput};
use crate::category::Category;
use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::media::StreamDescriptor;
use crate::scoring::{ComplianceReport, RiskScore, ViolationInstance};
use crate::signal::Confidence;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// REQUEST
// ============================================================================

/// A request to analyse one media item. Immutable once dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub request_id: Uuid,
    pub source: PathBuf,
    /// Category names as given by the caller; validated before dispatch.
    pub enabled_categories: Vec<String>,
    pub time_budget: Duration,
}

impl AnalysisRequest {
    pub fn new<I, S>(source: impl Into<PathBuf>, categories: I, time_budget: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            request_id: Uuid::new_v4(),
            source: source.into(),
            enabled_categories: categories.into_iter().map(Into::into).collect(),
            time_budget,
        }
    }

    /// A request for every known category.
    pub fn all_categories(source: impl Into<PathBuf>, time_budget: Duration) -> Self {
        Self::new(source, Category::ALL.iter().map(|c| c.name()), time_budget)
    }

    /// Validates the request and returns its categories in request order,
    /// without duplicates.
    pub fn categories(&self) -> CoreResult<Vec<Category>> {
        if self.source.as_os_str().is_empty() {
            return Err(CoreError::InvalidRequest("source is empty".to_string()));
        }
        if self.time_budget.is_zero() {
            return Err(CoreError::InvalidRequest("time budget must be positive".to_string()));
        }
        if self.enabled_categories.is_empty() {
            return Err(CoreError::InvalidRequest("no categories enabled".to_string()));
        }

        let mut seen = BTreeSet::new();
        let mut categories = Vec::new();
        for name in &self.enabled_categories {
            let category: Category = name.parse()?;
            if seen.insert(category) {
                categories.push(category);
            }
        }
        Ok(categories)
    }
}

// ============================================================================
// SECTIONS
// ============================================================================

/// Why a category did not produce a full result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Result of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySection {
    pub category: Category,
    pub confidence: Confidence,
    /// `None` when the category produced no data.
    pub risk: Option<f64>,
    pub metrics: Option<CategoryMetrics>,
    pub violations: Vec<ViolationInstance>,
    pub diagnostics: Vec<String>,
    pub error: Option<SectionError>,
    pub elapsed_ms: u64,
}

impl CategorySection {
    pub fn from_output(
        output: CategoryOutput,
        violations: Vec<ViolationInstance>,
        risk: f64,
        elapsed: Duration,
    ) -> Self {
        Self {
            category: output.category,
            confidence: output.confidence,
            risk: Some(risk),
            metrics: Some(output.metrics),
            violations,
            diagnostics: output.diagnostics,
            error: None,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    /// A section for a category that failed. Degraded sections never carry
    /// data, so they read as unavailable rather than as "no risk".
    pub fn degraded(category: Category, kind: ErrorKind, message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            category,
            confidence: Confidence::Unavailable,
            risk: None,
            metrics: None,
            violations: Vec::new(),
            diagnostics: Vec::new(),
            error: Some(SectionError {
                kind,
                message: message.into(),
            }),
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn from_error(category: Category, err: &CoreError, elapsed: Duration) -> Self {
        Self::degraded(category, err.kind(), err.to_string(), elapsed)
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// A category that did not complete at full confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedCategory {
    pub category: Category,
    /// `None` for a category that ran but only produced an estimate.
    pub kind: Option<ErrorKind>,
    pub confidence: Confidence,
    pub message: String,
}

// ============================================================================
// RECORD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Running,
    Completed,
    PartialFailure,
    Failed,
}

impl RecordStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RecordStatus::Completed | RecordStatus::PartialFailure | RecordStatus::Failed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Running => "running",
            RecordStatus::Completed => "completed",
            RecordStatus::PartialFailure => "partial_failure",
            RecordStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request-level failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFailure {
    pub kind: ErrorKind,
    pub message: String,
}

/// Aggregated results installed by [`AnalysisRecord::complete`].
pub(crate) struct RecordOutcome {
    pub sections: Vec<CategorySection>,
    pub violations: Vec<ViolationInstance>,
    pub risk: RiskScore,
    pub compliance: ComplianceReport,
    pub validation: ValidationReport,
    pub recommendations: Vec<Recommendation>,
    pub degraded: Vec<DegradedCategory>,
}

/// The auditable outcome of one request.
///
/// Fields are only written through the lifecycle methods below; callers read
/// them through accessors, so a sealed record cannot be altered.
///
/// `status` is `Completed` only when every requested category produced
/// Definitive data, mandatory or not; anything less is `PartialFailure`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    request_id: Uuid,
    source: PathBuf,
    status: RecordStatus,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    enabled_categories: Vec<String>,
    descriptor: Option<StreamDescriptor>,
    sections: Vec<CategorySection>,
    violations: Vec<ViolationInstance>,
    risk: RiskScore,
    compliance: ComplianceReport,
    validation: ValidationReport,
    recommendations: Vec<Recommendation>,
    degraded: Vec<DegradedCategory>,
    failure: Option<RecordFailure>,
}

impl AnalysisRecord {
    pub fn new(request: &AnalysisRequest) -> Self {
        Self {
            request_id: request.request_id,
            source: request.source.clone(),
            status: RecordStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            enabled_categories: request.enabled_categories.clone(),
            descriptor: None,
            sections: Vec::new(),
            violations: Vec::new(),
            risk: RiskScore::default(),
            compliance: ComplianceReport::default(),
            validation: ValidationReport::new(),
            recommendations: Vec::new(),
            degraded: Vec::new(),
            failure: None,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn enabled_categories(&self) -> &[String] {
        &self.enabled_categories
    }

    pub fn descriptor(&self) -> Option<&StreamDescriptor> {
        self.descriptor.as_ref()
    }

    /// Category sections in request order.
    pub fn sections(&self) -> &[CategorySection] {
        &self.sections
    }

    pub fn violations(&self) -> &[ViolationInstance] {
        &self.violations
    }

    pub fn risk(&self) -> &RiskScore {
        &self.risk
    }

    pub fn compliance(&self) -> &ComplianceReport {
        &self.compliance
    }

    pub fn validation(&self) -> &ValidationReport {
        &self.validation
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub fn degraded(&self) -> &[DegradedCategory] {
        &self.degraded
    }

    /// Request-level failure of a `Failed` record.
    pub fn failure(&self) -> Option<&RecordFailure> {
        self.failure.as_ref()
    }

    pub fn is_sealed(&self) -> bool {
        self.status.is_terminal()
    }

    pub(crate) fn ensure_open(&self) -> CoreResult<()> {
        if self.is_sealed() {
            return Err(CoreError::Internal(format!(
                "record {} is sealed ({})",
                self.request_id, self.status
            )));
        }
        Ok(())
    }

    /// Pending -> Running.
    pub fn start(&mut self) -> CoreResult<()> {
        self.ensure_open()?;
        if self.status != RecordStatus::Pending {
            return Err(CoreError::Internal(format!(
                "record {} cannot start from {}",
                self.request_id, self.status
            )));
        }
        self.status = RecordStatus::Running;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn set_descriptor(&mut self, descriptor: StreamDescriptor) -> CoreResult<()> {
        self.ensure_open()?;
        self.descriptor = Some(descriptor);
        Ok(())
    }

    /// Seals the record as `Failed`, discarding any partial results.
    pub fn fail(&mut self, err: &CoreError) -> CoreResult<()> {
        self.ensure_open()?;
        self.sections.clear();
        self.violations.clear();
        self.recommendations.clear();
        self.degraded.clear();
        self.risk = RiskScore::default();
        self.compliance = ComplianceReport::default();
        self.failure = Some(RecordFailure {
            kind: err.kind(),
            message: err.to_string(),
        });
        self.validation.add_error(err.to_string(), "request");
        self.seal(RecordStatus::Failed)
    }

    /// Installs the aggregated results and seals the record with `status`.
    pub(crate) fn complete(&mut self, outcome: RecordOutcome, status: RecordStatus) -> CoreResult<()> {
        self.ensure_open()?;
        self.sections = outcome.sections;
        self.violations = outcome.violations;
        self.risk = outcome.risk;
        self.compliance = outcome.compliance;
        self.validation = outcome.validation;
        self.recommendations = outcome.recommendations;
        self.degraded = outcome.degraded;
        self.seal(status)
    }

    /// Seals the record with a terminal status.
    fn seal(&mut self, status: RecordStatus) -> CoreResult<()> {
        self.ensure_open()?;
        if !status.is_terminal() {
            return Err(CoreError::Internal(format!("{} is not a terminal status", status)));
        }
        self.status = status;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn section(&self, category: Category) -> Option<&CategorySection> {
        self.sections.iter().find(|s| s.category == category)
    }

    pub fn is_degraded(&self, category: Category) -> bool {
        self.degraded.iter().any(|d| d.category == category)
    }

    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
