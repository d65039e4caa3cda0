//! Run command implementation

use anyhow::{Context, Result};
use chrono::Local;
use pf_etl::{Phase, PhaseStatus, PhaseTiming, PipelineReport, Progress, Silent};
use serde::Serialize;
use std::time::Instant;

use crate::cli::{GlobalArgs, OutputFormat, RunArgs};
use crate::commands::common::{print_json, status_mark, ExitCode};
use crate::context::RuntimeContext;

/// Prints one line per finished phase.
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn phase_finished(&self, timing: &PhaseTiming) {
        match timing.status {
            PhaseStatus::Skipped => println!(
                "  - {} skipped ({})",
                timing.phase,
                timing.detail.as_deref().unwrap_or("")
            ),
            PhaseStatus::Success => {
                println!("  {} {} [{}ms]", status_mark(true), timing.phase, timing.duration_ms)
            }
            PhaseStatus::Failed => println!(
                "  {} {} - {} [{}ms]",
                status_mark(false),
                timing.phase,
                timing.detail.as_deref().unwrap_or("failed"),
                timing.duration_ms
            ),
        }
    }
}

/// JSON document printed by `pf run --output json`
#[derive(Serialize)]
struct RunSummary<'a> {
    name: &'a str,
    target: Option<&'a str>,
    started_at: String,
    elapsed_ms: u64,
    success: bool,
    #[serde(flatten)]
    report: &'a PipelineReport,
}

/// Execute the run command
pub(crate) async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let mut options = ctx.pipeline_options()?;
    if let Some(strategy) = args.strategy {
        options.strategy = strategy.into();
    }
    if args.no_mark {
        options.marking.enabled = false;
    }
    ctx.verbose(&format!(
        "source {} -> warehouse {} ({} load)",
        options.source.describe(),
        options.warehouse.describe(),
        options.strategy
    ));

    let started_at = Local::now();
    let start_time = Instant::now();
    let report = match args.output {
        OutputFormat::Text => {
            println!("Running pipeline '{}'...\n", ctx.config.name);
            pf_etl::run(&options, &ConsoleProgress).await
        }
        OutputFormat::Json => pf_etl::run(&options, &Silent).await,
    }
    .context("Pipeline run failed")?;
    let elapsed_ms = start_time.elapsed().as_millis() as u64;

    match args.output {
        OutputFormat::Text => print_text_summary(&report, elapsed_ms),
        OutputFormat::Json => print_json(&RunSummary {
            name: &ctx.config.name,
            target: ctx.target.as_deref(),
            started_at: started_at.to_rfc3339(),
            elapsed_ms,
            success: report.is_success(),
            report: &report,
        })?,
    }

    if !report.is_success() {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn print_text_summary(report: &PipelineReport, elapsed_ms: u64) {
    println!();
    let extracted: usize = report.extracted.iter().map(|c| c.rows).sum();
    let missing: Vec<&str> = report
        .extracted
        .iter()
        .filter(|c| c.missing)
        .map(|c| c.entity.as_str())
        .collect();
    println!("Extracted {} rows", extracted);
    if !missing.is_empty() {
        println!("  no extraction query for: {}", missing.join(", "));
    }

    if let Some(load) = &report.load {
        println!("Loaded ({} strategy):", load.strategy.unwrap_or_default());
        for table in &load.tables {
            match &table.error {
                None => println!(
                    "  {} {:<18} {}/{} rows",
                    status_mark(true),
                    table.table,
                    table.rows_inserted,
                    table.rows_attempted
                ),
                Some(error) => println!("  {} {:<18} {}", status_mark(false), table.table, error),
            }
        }
    }

    if let Some(marks) = &report.marks {
        println!(
            "Marked {} source rows in {} statements",
            marks.rows_updated(),
            marks.statements()
        );
    }
    if let Some(error) = &report.marking_error {
        println!("Marking failed: {}", error);
    }

    let mark_skipped = report
        .phase(Phase::Mark)
        .is_some_and(|p| p.status == PhaseStatus::Skipped);
    if mark_skipped && report.load.as_ref().is_some_and(|l| !l.is_success()) {
        println!("Source rows were not marked; they will be extracted again next run");
    }

    println!();
    println!(
        "{} Pipeline {} in {}ms",
        status_mark(report.is_success()),
        if report.is_success() {
            "completed"
        } else {
            "finished with errors"
        },
        elapsed_ms
    );
}
