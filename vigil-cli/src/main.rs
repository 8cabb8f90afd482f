// vigil-cli/src/main.rs
//
// Entry point of the `vigil` binary: parses arguments, sets up logging,
// dispatches the command and maps the outcome to the process exit code
// (0 completed, 2 partial failure, 1 failed or error).

use clap::Parser;
use log::error;
use std::process;
use vigil_cli::commands::analyze::known_category_names;
use vigil_cli::logging::{init_console_logging, init_file_logging};
use vigil_cli::output::{print_error, set_color};
use vigil_cli::{Cli, Commands, CliResult, exit_code, run_analyze, run_categories};
use vigil_core::ErrorKind;

fn run(cli: Cli) -> CliResult<i32> {
    match cli.command {
        Commands::Analyze(args) => {
            match &args.log_dir {
                Some(dir) => {
                    init_file_logging(dir, cli.verbose)?;
                }
                None => init_console_logging(cli.verbose),
            }

            let record = run_analyze(args)?;
            if let Some(failure) = record.failure() {
                if failure.kind == ErrorKind::InvalidRequest {
                    print_error(&format!(
                        "known categories: {}",
                        known_category_names().join(", ")
                    ));
                }
            }
            Ok(exit_code(record.status()))
        }
        Commands::Categories(args) => {
            init_console_logging(cli.verbose);
            run_categories(args)?;
            Ok(0)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    set_color(!cli.no_color);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            print_error(&format!("Error: {}", e));
            1
        }
    };
    process::exit(code);
}
