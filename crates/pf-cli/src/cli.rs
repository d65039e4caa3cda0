//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use pf_core::LoadStrategy;

/// Pmoflow - PMO star-schema ETL pipeline
#[derive(Parser, Debug)]
#[command(name = "pf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override target (source and warehouse connections)
    #[arg(short, long, global = true)]
    pub target: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run extract, transform, load and mark
    Run(RunArgs),

    /// Check configuration, query files and connections without running
    Check(CheckArgs),

    /// Print row counts of every warehouse table
    Verify(VerifyArgs),

    /// Clear the extraction flag on every marked source table
    ResetMarks(ResetMarksArgs),
}

/// Output formats shared by reporting commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// JSON document on stdout
    Json,
}

/// Load strategy override
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    /// Empty target tables before loading
    Clean,
    /// Keep existing rows and ignore duplicates
    Incremental,
}

impl From<StrategyArg> for LoadStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Clean => LoadStrategy::Clean,
            StrategyArg::Incremental => LoadStrategy::Incremental,
        }
    }
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Override load.strategy from the config file
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Do not flag extracted source rows
    #[arg(long)]
    pub no_mark: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Only check files; do not open database connections
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the reset-marks command
#[derive(Args, Debug)]
pub struct ResetMarksArgs {
    /// Confirm the reset; without it nothing is changed
    #[arg(long)]
    pub yes: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
