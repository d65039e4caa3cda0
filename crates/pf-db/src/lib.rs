//! pf-db - Database abstraction layer for Pmoflow
//!
//! This crate provides the `Database` trait and implementations for DuckDB
//! (embedded files) and MySQL (over sqlx).

pub mod duckdb;
pub mod error;
pub mod mysql;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use mysql::MySqlBackend;
pub use traits::Database;

use pf_core::{DatabaseConfig, DbType};

/// Open a connection described by `config`.
pub async fn connect(config: &DatabaseConfig) -> DbResult<Box<dyn Database>> {
    config.validate("connection")?;
    log::debug!("Connecting to {}", config.describe());
    match config.db_type {
        DbType::DuckDb => {
            let path = config.path.as_deref().unwrap_or(":memory:");
            Ok(Box::new(DuckDbBackend::new(path)?))
        }
        DbType::MySql => Ok(Box::new(MySqlBackend::connect(config).await?)),
    }
}
