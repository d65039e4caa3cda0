//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate};
use duckdb::types::{TimeUnit, Value};
use duckdb::Connection;
use pf_core::{DbType, SqlValue, Table};
use pf_sql::{DuckDbDialect, SqlDialect};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Days from 0001-01-01 (CE) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
    dialect: DuckDbDialect,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::with_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", path.display(), e)))?;
        Ok(Self::with_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            dialect: DuckDbDialect::new(),
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Run a query synchronously and collect every row.
    ///
    /// Rows are collected via `query_map` before reading column metadata;
    /// DuckDB cannot report columns of a statement that has not executed.
    fn query_sync(&self, sql: &str) -> DbResult<Table> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows: Vec<Vec<SqlValue>> = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                (0..col_count)
                    .map(|i| row.get::<_, Value>(i).map(from_duckdb_value))
                    .collect::<duckdb::Result<Vec<_>>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let columns: Vec<String> = (0..stmt.column_count())
            .map(|i| stmt.column_name(i).map_or("?".to_string(), |v| v.to_string()))
            .collect();

        Table::with_rows("result", columns, rows).map_err(|e| DbError::Internal(e.to_string()))
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        let conn = self.lock()?;
        let values: Vec<Value> = params.iter().map(to_duckdb_value).collect();
        conn.execute(sql, duckdb::params_from_iter(values))
            .map_err(|e| statement_error(e, sql))
    }

    /// Prepare `sql` once and run it for every row
    fn execute_many_sync(&self, sql: &str, rows: &[Vec<SqlValue>]) -> DbResult<usize> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare_cached(sql)
            .map_err(|e| statement_error(e, sql))?;
        let mut affected = 0;
        for row in rows {
            let values: Vec<Value> = row.iter().map(to_duckdb_value).collect();
            affected += stmt
                .execute(duckdb::params_from_iter(values))
                .map_err(|e| statement_error(e, sql))?;
        }
        Ok(affected)
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    fn transaction_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::TransactionError(format!("{}: {}", sql, e)))
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;

        // Handle schema-qualified names
        let (schema, table) = if let Some(pos) = name.rfind('.') {
            (&name[..pos], &name[pos + 1..])
        } else {
            ("main", name)
        };

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            duckdb::params![schema, table],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}

/// Attach the failing statement to execution errors.
fn statement_error(e: duckdb::Error, sql: &str) -> DbError {
    match DbError::from(e) {
        DbError::ExecutionError(msg) => DbError::ExecutionError(format!("{}: {}", msg, sql)),
        other => other,
    }
}

/// Convert a DuckDB cell into a dynamically typed value.
fn from_duckdb_value(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(b) => SqlValue::Bool(b),
        Value::TinyInt(i) => SqlValue::Int(i64::from(i)),
        Value::SmallInt(i) => SqlValue::Int(i64::from(i)),
        Value::Int(i) => SqlValue::Int(i64::from(i)),
        Value::BigInt(i) => SqlValue::Int(i),
        Value::UTinyInt(i) => SqlValue::Int(i64::from(i)),
        Value::USmallInt(i) => SqlValue::Int(i64::from(i)),
        Value::UInt(i) => SqlValue::Int(i64::from(i)),
        Value::UBigInt(i) => i64::try_from(i)
            .map(SqlValue::Int)
            .unwrap_or(SqlValue::Float(i as f64)),
        Value::HugeInt(i) => i64::try_from(i)
            .map(SqlValue::Int)
            .unwrap_or(SqlValue::Float(i as f64)),
        Value::Float(f) => SqlValue::Float(f64::from(f)),
        Value::Double(f) => SqlValue::Float(f),
        Value::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map(SqlValue::Float)
            .unwrap_or(SqlValue::Null),
        Value::Text(s) => SqlValue::Text(s),
        Value::Enum(s) => SqlValue::Text(s),
        Value::Date32(days) => days
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map_or(SqlValue::Null, SqlValue::Date),
        Value::Timestamp(unit, raw) => DateTime::from_timestamp_micros(to_micros(unit, raw))
            .map_or(SqlValue::Null, |dt| SqlValue::DateTime(dt.naive_utc())),
        other => SqlValue::Text(format!("{other:?}")),
    }
}

fn to_micros(unit: TimeUnit, raw: i64) -> i64 {
    match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    }
}

/// Convert a parameter into a DuckDB value.
fn to_duckdb_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Boolean(*b),
        SqlValue::Int(i) => Value::BigInt(*i),
        SqlValue::Float(f) if f.is_nan() => Value::Null,
        SqlValue::Float(f) => Value::Double(*f),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Date(d) => Value::Date32(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
        SqlValue::DateTime(dt) => {
            Value::Timestamp(TimeUnit::Microsecond, dt.and_utc().timestamp_micros())
        }
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn query(&self, sql: &str) -> DbResult<Table> {
        self.query_sync(sql)
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        self.execute_sync(sql, params)
    }

    async fn execute_many(&self, sql: &str, rows: &[Vec<SqlValue>]) -> DbResult<usize> {
        self.execute_many_sync(sql, rows)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn begin(&self) -> DbResult<()> {
        self.transaction_sync(self.dialect.begin_transaction())
    }

    async fn commit(&self) -> DbResult<()> {
        self.transaction_sync("COMMIT")
    }

    async fn rollback(&self) -> DbResult<()> {
        self.transaction_sync("ROLLBACK")
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    fn dialect(&self) -> &dyn SqlDialect {
        &self.dialect
    }

    fn db_type(&self) -> DbType {
        DbType::DuckDb
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
