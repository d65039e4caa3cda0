//! The pipeline runner: extract, transform, load, mark.
//!
//! Each phase that touches a database opens its own connection and drops it
//! when the phase ends. Extraction errors abort the run. A skipped load or a
//! failed table suppresses marking, so rows that never reached the warehouse
//! are extracted again next time. A marking failure is reported without
//! failing the run.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use pf_core::{Config, DatabaseConfig, LoadStrategy, MarkingConfig, TransformConfig};
use pf_sql::QuerySet;
use serde::Serialize;

use crate::error::EtlResult;
use crate::extract::extract;
use crate::load::{LoadReport, Loader};
use crate::mark::{MarkReport, Marker};
use crate::snapshot::{EntityCount, SourceSnapshot};
use crate::star::{StarSchema, TableCount};
use crate::transform::transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Extract,
    Transform,
    Load,
    Mark,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Extract => write!(f, "extract"),
            Phase::Transform => write!(f, "transform"),
            Phase::Load => write!(f, "load"),
            Phase::Mark => write!(f, "mark"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Success,
    Failed,
    Skipped,
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseStatus::Success => write!(f, "success"),
            PhaseStatus::Failed => write!(f, "failed"),
            PhaseStatus::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseTiming {
    pub phase: Phase,
    pub status: PhaseStatus,
    pub duration_ms: u64,
    /// Why the phase was skipped or failed.
    pub detail: Option<String>,
}

/// Observer for phase boundaries, used by the CLI to print progress.
pub trait Progress: Send + Sync {
    fn phase_started(&self, _phase: Phase) {}

    fn phase_finished(&self, _timing: &PhaseTiming) {}
}

/// A [`Progress`] that reports nothing.
pub struct Silent;

impl Progress for Silent {}

/// Everything one run needs, resolved from configuration.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub source: DatabaseConfig,
    pub warehouse: DatabaseConfig,
    pub extraction_queries: QuerySet,
    pub load_queries: QuerySet,
    pub transform: TransformConfig,
    pub strategy: LoadStrategy,
    pub marking: MarkingConfig,
}

impl PipelineOptions {
    /// Resolve connections for `target` and read both query files.
    ///
    /// A missing query file or password variable is fatal here, before any
    /// phase runs.
    pub fn from_config(config: &Config, root: &Path, target: Option<&str>) -> EtlResult<Self> {
        Ok(Self {
            source: config.source_config(target)?.with_resolved_password()?,
            warehouse: config.warehouse_config(target)?.with_resolved_password()?,
            extraction_queries: QuerySet::load(&config.extraction_queries_path(root))?,
            load_queries: QuerySet::load(&config.load_queries_path(root))?,
            transform: config.transform.clone(),
            strategy: config.load.strategy,
            marking: config.marking.clone(),
        })
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub extracted: Vec<EntityCount>,
    pub transformed: Vec<TableCount>,
    pub load: Option<LoadReport>,
    pub marks: Option<MarkReport>,
    pub marking_error: Option<String>,
    pub phases: Vec<PhaseTiming>,
}

impl PipelineReport {
    /// True when every attempted table loaded and marking did not fail.
    pub fn is_success(&self) -> bool {
        self.load.as_ref().map_or(true, LoadReport::is_success) && self.marking_error.is_none()
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseTiming> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    fn record(
        &mut self,
        progress: &dyn Progress,
        phase: Phase,
        started: Instant,
        status: PhaseStatus,
        detail: Option<String>,
    ) {
        let timing = PhaseTiming {
            phase,
            status,
            duration_ms: started.elapsed().as_millis() as u64,
            detail,
        };
        progress.phase_finished(&timing);
        self.phases.push(timing);
    }
}

/// Run the whole pipeline once.
pub async fn run(options: &PipelineOptions, progress: &dyn Progress) -> EtlResult<PipelineReport> {
    let mut report = PipelineReport::default();

    progress.phase_started(Phase::Extract);
    let started = Instant::now();
    let snapshot = extract_phase(options).await?;
    report.extracted = snapshot.counts();
    report.record(progress, Phase::Extract, started, PhaseStatus::Success, None);

    progress.phase_started(Phase::Transform);
    let started = Instant::now();
    let schema = transform(&snapshot, &options.transform);
    report.transformed = schema.counts();
    report.record(progress, Phase::Transform, started, PhaseStatus::Success, None);

    progress.phase_started(Phase::Load);
    let started = Instant::now();
    if schema.has_no_projects() {
        log::info!("No projects extracted; nothing to load");
        report.record(
            progress,
            Phase::Load,
            started,
            PhaseStatus::Skipped,
            Some("no projects".to_string()),
        );
    } else {
        let load = load_phase(options, &schema).await?;
        let status = if load.is_success() {
            PhaseStatus::Success
        } else {
            PhaseStatus::Failed
        };
        let detail = (!load.is_success()).then(|| {
            load.failed()
                .map(|t| t.table.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        });
        report.load = Some(load);
        report.record(progress, Phase::Load, started, status, detail);
    }

    progress.phase_started(Phase::Mark);
    let started = Instant::now();
    let load_failed = report.load.as_ref().is_some_and(|l| !l.is_success());
    if !options.marking.enabled {
        report.record(
            progress,
            Phase::Mark,
            started,
            PhaseStatus::Skipped,
            Some("marking disabled".to_string()),
        );
    } else if report.load.is_none() {
        // Rows of an empty run never reached the warehouse; leave them pending.
        log::info!("Nothing loaded; skipping marking");
        report.record(
            progress,
            Phase::Mark,
            started,
            PhaseStatus::Skipped,
            Some("nothing loaded".to_string()),
        );
    } else if load_failed {
        log::warn!("Skipping marking because some tables failed to load");
        report.record(
            progress,
            Phase::Mark,
            started,
            PhaseStatus::Skipped,
            Some("load failed".to_string()),
        );
    } else {
        match mark_phase(options, &snapshot).await {
            Ok(marks) => {
                report.marks = Some(marks);
                report.record(progress, Phase::Mark, started, PhaseStatus::Success, None);
            }
            Err(e) => {
                log::error!("Marking failed: {}", e);
                report.marking_error = Some(e.to_string());
                report.record(
                    progress,
                    Phase::Mark,
                    started,
                    PhaseStatus::Failed,
                    Some(e.to_string()),
                );
            }
        }
    }

    Ok(report)
}

async fn extract_phase(options: &PipelineOptions) -> EtlResult<SourceSnapshot> {
    let source = pf_db::connect(&options.source).await?;
    extract(source.as_ref(), &options.extraction_queries).await
}

async fn load_phase(options: &PipelineOptions, schema: &StarSchema) -> EtlResult<LoadReport> {
    let warehouse = pf_db::connect(&options.warehouse).await?;
    let loader = Loader::new(warehouse.as_ref(), &options.load_queries, options.strategy);
    Ok(loader.load(schema).await)
}

async fn mark_phase(options: &PipelineOptions, snapshot: &SourceSnapshot) -> EtlResult<MarkReport> {
    let source = pf_db::connect(&options.source).await?;
    Marker::new(source.as_ref(), &options.marking)
        .mark(snapshot)
        .await
}
