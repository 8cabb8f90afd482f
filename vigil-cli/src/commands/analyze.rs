// ============================================================================
// vigil-cli/src/commands/analyze.rs
// ============================================================================
//
// ANALYZE COMMAND: One Request, One Sealed Record
//
// 1. Load and adjust the engine configuration.
// 2. Build the request from the command-line arguments.
// 3. Run it (with a spinner on interactive terminals).
// 4. Log the outcome, persist the record when an output directory is given,
//    and render it as JSON or as a summary.
//
// A persistence failure is reported but never changes the record or the
// exit status derived from it.

use crate::cli::AnalyzeArgs;
use crate::commands::load_config;
use crate::error::{CliErrorContext, CliResult};
use crate::output::{create_spinner, print_error, print_record};
use console::Term;
use log::{debug, info};
use std::time::Duration;
use vigil_core::file_logging::log_record;
use vigil_core::sink::persist;
use vigil_core::{AnalysisRecord, AnalysisRequest, Category, JsonFileSink, Orchestrator};

/// Converts the budget argument; anything that is not a positive, finite
/// number of seconds becomes zero, which the engine rejects.
fn budget_from_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

pub fn build_request(args: &AnalyzeArgs) -> AnalysisRequest {
    let budget = budget_from_secs(args.budget);
    match &args.categories {
        Some(names) => AnalysisRequest::new(
            args.source.clone(),
            names.iter().map(|n| n.trim().to_string()),
            budget,
        ),
        None => AnalysisRequest::all_categories(args.source.clone(), budget),
    }
}

pub fn run_analyze(args: AnalyzeArgs) -> CliResult<AnalysisRecord> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(max_parallel) = args.max_parallel {
        config.resources.max_parallel = max_parallel as usize;
    }
    let orchestrator = Orchestrator::new(config).cli_context("invalid engine configuration")?;

    let request = build_request(&args);
    debug!(
        "Request {}: {:?} within {:?}",
        request.request_id, request.enabled_categories, request.time_budget
    );

    let spinner = (!args.json && Term::stderr().is_term()).then(|| {
        create_spinner(&format!("Analysing {}", args.source.display()))
    });
    let record = orchestrator.run(&request);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    log_record(&record);

    if let Some(dir) = &args.output_dir {
        let sink = JsonFileSink::new(dir);
        match persist(&sink, &record) {
            Ok(()) => info!("Record written to {}", sink.path_for(&record).display()),
            Err(e) => print_error(&format!("Failed to write record: {}", e)),
        }
    }

    if args.json {
        println!("{}", record.to_json()?);
    } else {
        print_record(&record);
    }

    Ok(record)
}

/// Names accepted by `--categories`, for error messages.
pub fn known_category_names() -> Vec<&'static str> {
    Category::ALL.iter().map(|c| c.name()).collect()
}
