// vigil-cli/src/lib.rs
//
// Library portion of the Vigil CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::{AnalyzeArgs, CategoriesArgs, Cli, Commands};
pub use commands::analyze::run_analyze;
pub use commands::categories::run_categories;
pub use error::{CliErrorContext, CliResult};

use vigil_core::RecordStatus;

/// Process exit code for a sealed record.
pub fn exit_code(status: RecordStatus) -> i32 {
    match status {
        RecordStatus::Completed => 0,
        RecordStatus::PartialFailure => 2,
        RecordStatus::Failed | RecordStatus::Pending | RecordStatus::Running => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(RecordStatus::Completed), 0);
        assert_eq!(exit_code(RecordStatus::PartialFailure), 2);
        assert_eq!(exit_code(RecordStatus::Failed), 1);
    }
}
