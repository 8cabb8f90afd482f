// vigil-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Vigil: media quality-control and compliance analysis",
    long_about = "Runs photosensitivity, editing-pace, loudness and delivery-format checks \
                  on a media item via vigil-core and reports risk and compliance."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value_t = false)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyses one media item and reports violations, risk and compliance
    Analyze(AnalyzeArgs),

    /// Lists the available check categories
    Categories(CategoriesArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Media item to analyse
    #[arg(required = true, value_name = "SOURCE")]
    pub source: PathBuf,

    /// Comma-separated categories to run (default: all)
    #[arg(short, long, value_delimiter = ',', value_name = "CATEGORIES")]
    pub categories: Option<Vec<String>>,

    /// Overall time budget for the request, in seconds
    #[arg(short, long, value_name = "SECS", default_value_t = 600.0)]
    pub budget: f64,

    /// Maximum number of categories analysed at the same time
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..=64))]
    pub max_parallel: Option<u16>,

    /// Optional: TOML configuration file
    #[arg(long, value_name = "FILE", env = "VIGIL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the full record as JSON instead of a summary
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Optional: Directory where the record is written as <request_id>.json
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Optional: Directory for log files
    #[arg(short, long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CategoriesArgs {
    /// Optional: TOML configuration file (for the mandatory category list)
    #[arg(long, value_name = "FILE", env = "VIGIL_CONFIG")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_basic_args() {
        let cli = Cli::parse_from(["vigil", "analyze", "promo.mxf"]);
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.source, PathBuf::from("promo.mxf"));
                assert!(args.categories.is_none());
                assert_eq!(args.budget, 600.0);
                assert!(!args.json);
                assert!(args.output_dir.is_none());
            }
            other => panic!("expected analyze, got {:?}", other),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_analyze_full_args() {
        let cli = Cli::parse_from([
            "vigil",
            "analyze",
            "promo.mxf",
            "--categories",
            "flash,loudness",
            "--budget",
            "30",
            "--max-parallel",
            "2",
            "--json",
            "--output-dir",
            "records",
            "-v",
        ]);
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(
                    args.categories,
                    Some(vec!["flash".to_string(), "loudness".to_string()])
                );
                assert_eq!(args.budget, 30.0);
                assert_eq!(args.max_parallel, Some(2));
                assert!(args.json);
                assert_eq!(args.output_dir, Some(PathBuf::from("records")));
            }
            other => panic!("expected analyze, got {:?}", other),
        }
        assert!(cli.verbose);
    }

    #[test]
    fn test_max_parallel_must_be_positive() {
        let result = Cli::try_parse_from(["vigil", "analyze", "a.mp4", "--max-parallel", "0"]);
        assert!(result.is_err());
    }
}
