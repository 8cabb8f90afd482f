// ============================================================================
// vigil-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Taxonomy for the Analysis Engine
//
// This module defines the error type shared by every component of the engine
// and the serialisable error kind that ends up in analysis records.
//
// KEY COMPONENTS:
// - CoreError: thiserror-based error enum
// - CoreResult: result alias used throughout the crate
// - ErrorKind: stable, serialisable classification recorded per category
// - Helper constructors for process start/exit failures
//
// CLASSIFICATION:
// - InvalidRequest: fatal, rejected before any task is dispatched
// - ToolUnavailable: fatal for the category (and the request when mandatory)
// - ToolTimeout / MalformedOutput / CommandFailed: soft, category degrades
// - Cancelled: the parent request was cancelled

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by the analysis engine.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Tool '{tool}' is unavailable: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("Tool '{tool}' exceeded its deadline after {elapsed:?}")]
    ToolTimeout { tool: String, elapsed: Duration },

    #[error("Malformed tool output: {0}")]
    MalformedOutput(String),

    #[error("Command '{0}' failed with status {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Analysis cancelled: {0}")]
    Cancelled(String),

    #[error("Resources exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for engine operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Serialisable classification of a [`CoreError`], recorded in analysis records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    ToolUnavailable,
    ToolTimeout,
    MalformedOutput,
    Cancelled,
    ResourceExhausted,
    Internal,
}

impl ErrorKind {
    /// Soft kinds degrade a single category instead of failing the request.
    pub fn is_soft(self) -> bool {
        matches!(
            self,
            ErrorKind::ToolTimeout | ErrorKind::MalformedOutput | ErrorKind::Internal
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "InvalidRequest",
            ErrorKind::ToolUnavailable => "ToolUnavailable",
            ErrorKind::ToolTimeout => "ToolTimeout",
            ErrorKind::MalformedOutput => "MalformedOutput",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::ResourceExhausted => "ResourceExhausted",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CoreError {
    /// Classifies this error for the analysis record.
    ///
    /// A non-zero tool exit leaves no usable output behind, so it is
    /// classified as `MalformedOutput`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidRequest(_) | CoreError::Config(_) => ErrorKind::InvalidRequest,
            CoreError::ToolUnavailable { .. } => ErrorKind::ToolUnavailable,
            CoreError::ToolTimeout { .. } => ErrorKind::ToolTimeout,
            CoreError::MalformedOutput(_)
            | CoreError::CommandFailed(..)
            | CoreError::Json(_) => ErrorKind::MalformedOutput,
            CoreError::Cancelled(_) => ErrorKind::Cancelled,
            CoreError::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            CoreError::Io(e) if e.kind() == io::ErrorKind::TimedOut => ErrorKind::ToolTimeout,
            CoreError::Io(_) | CoreError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the probe adapter may retry the invocation that produced this error.
    pub fn is_transient(&self) -> bool {
        match self {
            CoreError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

/// Maps a failure to start an external command.
///
/// A missing or non-executable binary is `ToolUnavailable`; anything else is
/// kept as an I/O error so the adapter can decide whether to retry.
pub fn command_start_error(tool: impl Into<String>, err: io::Error) -> CoreError {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => CoreError::ToolUnavailable {
            tool: tool.into(),
            reason: err.to_string(),
        },
        _ => CoreError::Io(err),
    }
}

/// Builds the error for a command that ran but exited unsuccessfully.
pub fn command_failed_error(
    tool: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    let stderr = stderr.into();
    // Keep the tail of stderr, ffmpeg puts the actual reason last.
    let tail: String = stderr
        .lines()
        .rev()
        .take(5)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n");
    CoreError::CommandFailed(tool.into(), status, tail)
}
