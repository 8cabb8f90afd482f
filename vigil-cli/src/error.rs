// ============================================================================
// vigil-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reuses the core error type. Context added here keeps the error
// kind of the underlying failure, so a bad configuration file still reads as
// an invalid request in the exit path.

use vigil_core::{CoreError, CoreResult};

use std::fmt;

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

// ============================================================================
// ERROR CONVERSION UTILITIES
// ============================================================================

/// Extension trait for adding context to errors in the CLI.
pub trait CliErrorContext<T> {
    /// Add context to an error.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

fn with_context(err: CoreError, context: impl fmt::Display) -> CoreError {
    match err {
        CoreError::InvalidRequest(msg) => CoreError::InvalidRequest(format!("{}: {}", context, msg)),
        CoreError::Config(msg) => CoreError::Config(format!("{}: {}", context, msg)),
        other => CoreError::Internal(format!("{}: {}", context, other)),
    }
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| with_context(e.into(), context))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| with_context(e.into(), f()))
    }
}

impl<T> CliErrorContext<T> for Option<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.ok_or_else(|| CoreError::Internal(context.to_string()))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| CoreError::Internal(f().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::ErrorKind;

    #[test]
    fn test_context_keeps_config_kind() {
        let result: Result<(), CoreError> = Err(CoreError::Config("bad".to_string()));
        let err = result.cli_context("loading vigil.toml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(err.to_string().contains("loading vigil.toml: bad"));
    }

    #[test]
    fn test_io_context_is_internal() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = result.cli_with_context(|| "creating output dir").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_option_context() {
        let missing: Option<u8> = None;
        assert!(missing.cli_context("no value").is_err());
        assert_eq!(Some(3).cli_context("no value").unwrap(), 3);
    }
}
