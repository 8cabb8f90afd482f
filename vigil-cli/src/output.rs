// ============================================================================
// vigil-cli/src/output.rs
// ============================================================================
//
// TERMINAL OUTPUT: Rendering of Records and Category Listings
//
// All human-readable output goes through this module. Styling uses the
// console crate and is switched off globally with `set_color(false)`.

use chrono::Local;
use console::{Style, style};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::time::Duration;
use vigil_core::aggregate::{ValidationLevel, ValidationReport};
use vigil_core::{AnalysisRecord, ComplianceLevel, RecordStatus, Severity};

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const WARNING_SYMBOL: &str = "!";
    pub const ERROR_SYMBOL: &str = "✗";
    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";
    pub const INDENT: &str = "  ";
}

/// Enables or disables colors on stdout and stderr.
pub fn set_color(enable: bool) {
    console::set_colors_enabled(enable);
    console::set_colors_enabled_stderr(enable);
}

pub fn print_section(title: &str) {
    println!();
    println!(
        "{}",
        style(format!(
            "{}{}{}",
            styling::SECTION_PREFIX,
            title,
            styling::SECTION_SUFFIX
        ))
        .cyan()
        .bold()
    );
}

pub fn print_info<T: Display>(label: &str, value: T) {
    println!("{}{:<14} {}", styling::INDENT, style(format!("{}:", label)).bold(), value);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", style(styling::ERROR_SYMBOL).red().bold(), message);
}

fn status_style(status: RecordStatus) -> Style {
    match status {
        RecordStatus::Completed => Style::new().green().bold(),
        RecordStatus::PartialFailure => Style::new().yellow().bold(),
        RecordStatus::Failed => Style::new().red().bold(),
        RecordStatus::Pending | RecordStatus::Running => Style::new().dim(),
    }
}

fn compliance_style(level: ComplianceLevel) -> Style {
    match level {
        ComplianceLevel::Full => Style::new().green(),
        ComplianceLevel::Partial => Style::new().yellow(),
        ComplianceLevel::NonCompliant => Style::new().red().bold(),
        ComplianceLevel::NotAssessed => Style::new().dim(),
    }
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Safe | Severity::Low => Style::new().dim(),
        Severity::Medium => Style::new().yellow(),
        Severity::High | Severity::Extreme => Style::new().red().bold(),
    }
}

/// Spinner shown on stderr while a request runs.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_validation(report: &ValidationReport) {
    for message in report.errors().into_iter().chain(report.warnings()) {
        let symbol = match message.level {
            ValidationLevel::Error => style(styling::ERROR_SYMBOL).red().bold(),
            _ => style(styling::WARNING_SYMBOL).yellow().bold(),
        };
        println!(
            "{}{} {}: {}",
            styling::INDENT,
            symbol,
            style(&message.category).bold(),
            message.message
        );
    }
}

/// Prints the summary of a sealed record.
pub fn print_record(record: &AnalysisRecord) {
    print_section("Analysis");
    print_info("Source", record.source().display());
    print_info("Request", record.request_id());
    if let Some(finished) = record.finished_at() {
        print_info(
            "Finished",
            finished.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        );
    }
    print_info(
        "Status",
        status_style(record.status()).apply_to(record.status().as_str()),
    );

    if let Some(failure) = record.failure() {
        print_info("Failure", format!("{} ({})", failure.message, failure.kind));
        return;
    }

    if let Some(descriptor) = record.descriptor() {
        print_info("Duration", format!("{:.2}s", descriptor.duration_secs));
        if let Some(video) = &descriptor.video {
            print_info(
                "Video",
                format!(
                    "{}x{} {} {}",
                    video.width.unwrap_or(0),
                    video.height.unwrap_or(0),
                    video.pix_fmt.as_deref().unwrap_or("?"),
                    video
                        .frame_rate
                        .map_or_else(|| "?".to_string(), |r| format!("{:.3} fps", r))
                ),
            );
        }
    }

    print_section("Categories");
    for section in record.sections() {
        match &section.error {
            Some(error) => println!(
                "{}{} {:<14} {} ({})",
                styling::INDENT,
                style(styling::ERROR_SYMBOL).red(),
                section.category.name(),
                error.message,
                error.kind
            ),
            None => println!(
                "{}{} {:<14} {} violation(s), risk {:.1}, {}",
                styling::INDENT,
                style(styling::SUCCESS_SYMBOL).green(),
                section.category.name(),
                section.violations.len(),
                section.risk.unwrap_or(0.0),
                section.confidence
            ),
        }
    }

    if !record.violations().is_empty() {
        print_section("Violations");
        for violation in record.violations() {
            println!(
                "{}{:>7.2}s-{:<7.2}s {} {}",
                styling::INDENT,
                violation.window.start,
                violation.window.end,
                severity_style(violation.severity).apply_to(format!("{:<8}", violation.severity.as_str())),
                violation.detail
            );
        }
    }

    print_section("Compliance");
    for standard in &record.compliance().standards {
        println!(
            "{}{:<32} {}",
            styling::INDENT,
            standard.standard.name(),
            compliance_style(standard.level).apply_to(standard.level.as_str())
        );
    }
    print_info(
        "Overall",
        compliance_style(record.compliance().overall).apply_to(record.compliance().overall.as_str()),
    );
    print_info(
        "Risk",
        format!(
            "{:.1} ({}, accuracy {:.2})",
            record.risk().overall, record.risk().severity, record.risk().accuracy
        ),
    );

    if !record.validation().passed || !record.validation().warnings().is_empty() {
        print_section("Validation");
        print_validation(record.validation());
    }

    if !record.recommendations().is_empty() {
        print_section("Recommendations");
        for rec in record.recommendations() {
            println!(
                "{}{} {}",
                styling::INDENT,
                severity_style(rec.priority).apply_to(format!("[{}]", rec.priority)),
                rec.message
            );
        }
    }
    println!();
}
