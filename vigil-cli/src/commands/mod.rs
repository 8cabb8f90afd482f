//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `analyze` command.
/// Runs one analysis request and renders or persists the sealed record.
pub mod analyze;

/// Module containing the implementation of the `categories` command.
pub mod categories;

use crate::error::{CliErrorContext, CliResult};
use std::path::Path;
use vigil_core::EngineConfig;

/// Loads the engine configuration from `path`, or the defaults.
pub(crate) fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .cli_with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}
