//! Check command implementation

use anyhow::Result;
use pf_core::DatabaseConfig;
use pf_db::Database;
use pf_etl::star::{column_count, load_template_name};
use pf_etl::LOAD_ORDER;
use pf_sql::{dialect_for, validate_extraction, validate_load, QueryIssue, QuerySet};
use std::path::Path;

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::common::{status_mark, ExitCode};
use crate::context::RuntimeContext;

/// Collects pass/fail lines for one check run
#[derive(Default)]
struct CheckReport {
    failures: usize,
}

impl CheckReport {
    fn pass(&self, what: &str) {
        println!("  {} {}", status_mark(true), what);
    }

    fn fail(&mut self, what: &str, why: impl std::fmt::Display) {
        println!("  {} {} - {}", status_mark(false), what, why);
        self.failures += 1;
    }

    fn issues(&mut self, what: &str, issues: &[QueryIssue]) {
        if issues.is_empty() {
            self.pass(what);
        } else {
            for issue in issues {
                self.fail(what, issue);
            }
        }
    }
}

/// Execute the check command
pub(crate) async fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let source = ctx.source()?;
    let warehouse = ctx.warehouse()?;
    let mut report = CheckReport::default();

    println!("Checking '{}'...\n", ctx.config.name);
    report.pass("configuration");

    if let Some(queries) = read_queries(&mut report, &ctx.config.extraction_queries_path(&ctx.root)) {
        let dialect = dialect_for(source.db_type);
        report.issues(
            "extraction queries",
            &validate_extraction(&queries, dialect.as_ref()),
        );
    }

    if let Some(queries) = read_queries(&mut report, &ctx.config.load_queries_path(&ctx.root)) {
        let names: Vec<(String, usize)> = LOAD_ORDER
            .iter()
            .filter_map(|table| column_count(table).map(|n| (load_template_name(table), n)))
            .collect();
        let expected: Vec<(&str, usize)> = names.iter().map(|(n, c)| (n.as_str(), *c)).collect();
        report.issues("load templates", &validate_load(&queries, &expected));
    }

    if args.offline {
        ctx.verbose("Skipping connection checks");
    } else {
        let marked: Vec<&str> = ctx
            .config
            .marking
            .tables
            .iter()
            .map(|t| t.table.as_str())
            .collect();
        check_connection(&mut report, "source", &source, &marked).await;
        check_connection(&mut report, "warehouse", &warehouse, &LOAD_ORDER).await;
    }

    println!();
    if report.failures > 0 {
        println!("{} {} check(s) failed", status_mark(false), report.failures);
        return Err(ExitCode(1).into());
    }
    println!("{} All checks passed", status_mark(true));
    Ok(())
}

fn read_queries(report: &mut CheckReport, path: &Path) -> Option<QuerySet> {
    let what = path.display().to_string();
    match QuerySet::load(path) {
        Ok(queries) => {
            report.pass(&what);
            Some(queries)
        }
        Err(e) => {
            report.fail(&what, e);
            None
        }
    }
}

/// Open a connection and confirm the tables the pipeline touches exist.
async fn check_connection(
    report: &mut CheckReport,
    role: &str,
    config: &DatabaseConfig,
    tables: &[&str],
) {
    let what = format!("{role} connection ({})", config.describe());
    let db = match pf_db::connect(config).await {
        Ok(db) => db,
        Err(e) => {
            report.fail(&what, e);
            return;
        }
    };
    report.pass(&what);

    let mut missing = Vec::new();
    for table in tables {
        match db.relation_exists(table).await {
            Ok(true) => {}
            Ok(false) => missing.push(*table),
            Err(e) => {
                report.fail(&format!("{role} table {table}"), e);
                return;
            }
        }
    }
    if missing.is_empty() {
        report.pass(&format!("{role} tables"));
    } else {
        report.fail(&format!("{role} tables"), format!("missing {}", missing.join(", ")));
    }
}
