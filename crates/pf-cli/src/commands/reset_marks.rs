//! Reset-marks command implementation

use anyhow::{Context, Result};
use pf_etl::Marker;

use crate::cli::{GlobalArgs, ResetMarksArgs};
use crate::commands::common::status_mark;
use crate::context::RuntimeContext;

/// Execute the reset-marks command
pub(crate) async fn execute(args: &ResetMarksArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let source = ctx.source()?;
    let marking = &ctx.config.marking;
    let tables: Vec<&str> = marking.tables.iter().map(|t| t.table.as_str()).collect();

    if !args.yes {
        println!(
            "This sets {} = 0 on {} in {}.",
            marking.flag_column,
            tables.join(", "),
            source.describe()
        );
        println!("Every row will be extracted again on the next run. Re-run with --yes to proceed.");
        return Ok(());
    }

    let db = pf_db::connect(&source)
        .await
        .context("Failed to connect to source")?;
    let reset = Marker::new(db.as_ref(), marking)
        .reset()
        .await
        .context("Failed to reset extraction flags")?;

    println!(
        "{} Reset {} flag(s) across {} table(s)",
        status_mark(true),
        reset,
        tables.len()
    );
    Ok(())
}
