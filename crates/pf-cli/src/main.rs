//! Pmoflow CLI - extract, transform and load PMO data into a star schema

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::Cli;
use commands::common::ExitCode;
use commands::{check, reset_marks, run, verify};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
        cli::Commands::Check(args) => check::execute(args, &cli.global).await,
        cli::Commands::Verify(args) => verify::execute(args, &cli.global).await,
        cli::Commands::ResetMarks(args) => reset_marks::execute(args, &cli.global).await,
    };

    match result {
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => std::process::exit(*code),
            None => Err(err),
        },
        ok => ok,
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` selects debug and the default is warn.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
