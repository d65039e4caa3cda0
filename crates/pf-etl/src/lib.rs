//! pf-etl - ETL core for Pmoflow
//!
//! This crate extracts the PMO source entities, reshapes them into a star
//! schema with derived project KPIs, loads that schema into the reporting
//! warehouse, and flags extracted source rows for incremental runs.

pub mod calendar;
pub mod entities;
pub mod error;
pub mod extract;
pub mod load;
pub mod mark;
pub mod metrics;
pub mod pipeline;
pub mod snapshot;
pub mod star;
pub mod transform;

pub use error::{EtlError, EtlResult};
pub use extract::extract;
pub use load::{LoadReport, Loader, TableLoad};
pub use mark::{MarkReport, Marker, TableMark};
pub use pipeline::{
    run, Phase, PhaseStatus, PhaseTiming, PipelineOptions, PipelineReport, Progress, Silent,
};
pub use snapshot::{EntityCount, SourceSnapshot};
pub use star::{StarSchema, TableCount, LOAD_ORDER};
pub use transform::{terminal_scope, transform};
