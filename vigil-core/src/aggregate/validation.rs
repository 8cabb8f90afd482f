//! Validation report: per-category info, warning and error messages.
//!
//! Messages are logged as they are added, so the log and the record tell the
//! same story.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Validation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    Error,
    Warning,
    Info,
}

impl Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationLevel::Info => write!(f, "INFO"),
            ValidationLevel::Warning => write!(f, "WARNING"),
            ValidationLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// A validation message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub message: String,
    pub level: ValidationLevel,
    /// Category name, or `request` for request-level messages
    pub category: String,
}

impl ValidationMessage {
    pub fn new<S: Into<String>, C: Into<String>>(level: ValidationLevel, message: S, category: C) -> Self {
        Self {
            message: message.into(),
            level,
            category: category.into(),
        }
    }
}

impl Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.category, self.message)
    }
}

/// Validation report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub messages: Vec<ValidationMessage>,

    /// False once any error was added
    pub passed: bool,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            passed: true,
        }
    }

    /// Adds a message, logging it immediately.
    pub fn add_message(&mut self, message: ValidationMessage) {
        match message.level {
            ValidationLevel::Info => log::info!("{}", message),
            ValidationLevel::Warning => log::warn!("{}", message),
            ValidationLevel::Error => log::error!("{}", message),
        }

        if message.level == ValidationLevel::Error {
            self.passed = false;
        }
        self.messages.push(message);
    }

    pub fn add_info<S: Into<String>, C: Into<String>>(&mut self, message: S, category: C) {
        self.add_message(ValidationMessage::new(ValidationLevel::Info, message, category));
    }

    pub fn add_warning<S: Into<String>, C: Into<String>>(&mut self, message: S, category: C) {
        self.add_message(ValidationMessage::new(ValidationLevel::Warning, message, category));
    }

    pub fn add_error<S: Into<String>, C: Into<String>>(&mut self, message: S, category: C) {
        self.add_message(ValidationMessage::new(ValidationLevel::Error, message, category));
    }

    fn at_level(&self, level: ValidationLevel) -> Vec<&ValidationMessage> {
        self.messages.iter().filter(|m| m.level == level).collect()
    }

    pub fn errors(&self) -> Vec<&ValidationMessage> {
        self.at_level(ValidationLevel::Error)
    }

    pub fn warnings(&self) -> Vec<&ValidationMessage> {
        self.at_level(ValidationLevel::Warning)
    }

    pub fn infos(&self) -> Vec<&ValidationMessage> {
        self.at_level(ValidationLevel::Info)
    }

    /// Multi-line report grouped by category, errors first.
    pub fn format(&self) -> String {
        let mut by_category: BTreeMap<&str, Vec<&ValidationMessage>> = BTreeMap::new();
        for msg in &self.messages {
            by_category.entry(msg.category.as_str()).or_default().push(msg);
        }

        let mut lines = Vec::new();
        lines.push("=".repeat(80));
        lines.push(format!(
            "VALIDATION REPORT - {}",
            if self.passed { "PASSED" } else { "FAILED" }
        ));
        lines.push("=".repeat(80));

        for (category, mut messages) in by_category {
            let errors = messages.iter().filter(|m| m.level == ValidationLevel::Error).count();
            let warnings = messages.iter().filter(|m| m.level == ValidationLevel::Warning).count();
            lines.push(format!(
                "{}: {} error(s), {} warning(s)",
                category, errors, warnings
            ));

            messages.sort_by_key(|m| m.level);
            for msg in messages {
                lines.push(format!("  [{}] {}", msg.level, msg.message));
            }
        }

        lines.push("=".repeat(80));
        lines.push(format!(
            "SUMMARY: {} error(s), {} warning(s), {} info message(s)",
            self.errors().len(),
            self.warnings().len(),
            self.infos().len()
        ));
        lines.join("\n")
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}
