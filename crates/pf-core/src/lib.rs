//! pf-core - Core library for Pmoflow
//!
//! This crate provides the configuration model (`pmoflow.yml`), the shared
//! source-entity vocabulary, and the tabular dataset types exchanged between
//! the database layer and the ETL pipeline.

pub mod config;
pub mod entity;
pub mod error;
pub mod table;

pub use config::{
    Config, DatabaseConfig, DbType, LoadConfig, LoadStrategy, Locale, MarkTable, MarkingConfig,
    ProjectScope, QueryPaths, TargetConfig, TransformConfig,
};
pub use entity::Entity;
pub use error::{CoreError, CoreResult};
pub use table::{Record, RowRef, SqlValue, Table};
