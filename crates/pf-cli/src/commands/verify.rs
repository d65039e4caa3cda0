//! Verify command implementation

use anyhow::{Context, Result};
use pf_db::Database;
use pf_etl::LOAD_ORDER;
use serde::Serialize;

use crate::cli::{GlobalArgs, OutputFormat, VerifyArgs};
use crate::commands::common::{print_json, status_mark, ExitCode};
use crate::context::RuntimeContext;

/// Row count of one warehouse table
#[derive(Debug, Serialize)]
struct TableRows {
    table: &'static str,
    rows: Option<i64>,
    error: Option<String>,
}

/// Execute the verify command
pub(crate) async fn execute(args: &VerifyArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let warehouse = ctx.warehouse()?;
    let db = pf_db::connect(&warehouse)
        .await
        .context("Failed to connect to warehouse")?;

    let mut results = Vec::with_capacity(LOAD_ORDER.len());
    for table in LOAD_ORDER {
        results.push(count_rows(db.as_ref(), table).await);
    }
    drop(db);

    match args.output {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Text => {
            println!("Warehouse {}\n", warehouse.describe());
            for r in &results {
                match (&r.rows, &r.error) {
                    (Some(rows), _) => {
                        println!("  {} {:<18} {:>8} rows", status_mark(true), r.table, rows)
                    }
                    (None, Some(error)) => {
                        println!("  {} {:<18} {}", status_mark(false), r.table, error)
                    }
                    (None, None) => println!("  {} {:<18} ?", status_mark(false), r.table),
                }
            }
        }
    }

    if results.iter().any(|r| r.error.is_some()) {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

async fn count_rows(db: &dyn Database, table: &'static str) -> TableRows {
    match db.query(&format!("SELECT COUNT(*) AS n FROM {table}")).await {
        Ok(result) => TableRows {
            table,
            rows: result.rows().first().and_then(|row| row.first()).and_then(|v| v.as_i64()),
            error: None,
        },
        Err(e) => TableRows {
            table,
            rows: None,
            error: Some(e.to_string()),
        },
    }
}
