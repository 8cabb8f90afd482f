// ============================================================================
// vigil-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console or File
//
// Only one global logger can be installed. Without a log directory the CLI
// installs env_logger on stderr (RUST_LOG is honoured, -v raises the default
// to debug). With a log directory it installs the core's log4rs file
// appender instead, so the terminal only shows the rendered summary.

use crate::error::CliResult;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use vigil_core::CoreError;
use vigil_core::file_logging::{log_file_path, setup_file_logging};

fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs console logging.
pub fn init_console_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .init();
}

/// Installs file logging under `log_dir` and returns the log file path.
pub fn init_file_logging(log_dir: &Path, verbose: bool) -> CliResult<PathBuf> {
    let path = log_file_path(log_dir);
    setup_file_logging(&path, default_level(verbose)).map_err(|e| {
        CoreError::Internal(format!("failed to set up logging in {}: {}", log_dir.display(), e))
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true), LevelFilter::Debug);
        assert_eq!(default_level(false), LevelFilter::Info);
    }
}
