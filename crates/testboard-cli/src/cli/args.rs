use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "testboard",
    version,
    about = "Rank CI jobs and tests by pass rate, failures and duration"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Build the four leaderboards from saved query results
    Report(ReportArgs),
    /// Print the testboard version
    Version,
}

#[derive(ValueEnum, Clone, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

#[derive(clap::Args, Clone, Debug)]
pub struct ReportArgs {
    /// Directory holding saved query responses (<records>/<query>.json)
    #[arg(long)]
    pub records: PathBuf,

    /// Query to load
    #[arg(long, default_value = "durations_by_test")]
    pub query: String,

    /// Schema name; cached responses are kept per schema
    #[arg(long, default_value = "fx-test")]
    pub schema: String,

    #[arg(long, env = "TESTBOARD_CACHE_DIR", default_value = ".cache")]
    pub cache_dir: PathBuf,

    /// Serve the query from the cache when an entry exists
    #[arg(long)]
    pub use_cache: bool,

    /// Report configuration (limits and thresholds, YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Jobs per leaderboard (overrides config)
    #[arg(long)]
    pub job_limit: Option<usize>,

    /// Tests per job (overrides config)
    #[arg(long)]
    pub test_limit: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}
