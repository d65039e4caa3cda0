//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use pf_core::{DbType, SqlValue, Table};
use pf_sql::SqlDialect;

/// Database abstraction trait for Pmoflow
///
/// A value wraps exactly one session, so `begin`/`commit`/`rollback` scope
/// every statement issued in between. Implementations must be Send + Sync
/// for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run a query and materialize every row
    async fn query(&self, sql: &str) -> DbResult<Table>;

    /// Execute one statement with positional parameters, returns affected rows
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize>;

    /// Execute one statement for every parameter row, returns affected rows.
    ///
    /// The statement is prepared once; the first failing row stops the batch.
    async fn execute_many(&self, sql: &str, rows: &[Vec<SqlValue>]) -> DbResult<usize>;

    /// Execute multiple SQL statements without parameters
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Open a transaction on this session
    async fn begin(&self) -> DbResult<()>;

    async fn commit(&self) -> DbResult<()>;

    async fn rollback(&self) -> DbResult<()>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// SQL dialect of this engine
    fn dialect(&self) -> &dyn SqlDialect;

    /// Database type identifier for logging
    fn db_type(&self) -> DbType;
}
