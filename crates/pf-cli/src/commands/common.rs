//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;

/// Error type representing a non-zero process exit code.
///
/// Return `Err(ExitCode(N).into())` instead of calling `std::process::exit`
/// so that connections are dropped before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the command has already printed its failure.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Status marker used at the start of result lines.
pub(crate) fn status_mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
