//! MySQL database backend implementation
//!
//! Holds a single `MySqlConnection` rather than a pool: transaction control
//! is issued as plain statements and must land on the same session as the
//! writes it scopes.

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use pf_core::{DatabaseConfig, DbType, SqlValue, Table};
use pf_sql::{MySqlDialect, SqlDialect};
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::types::BigDecimal;
use sqlx::{Column, Connection, Executor, MySql, Row, Statement, TypeInfo};
use tokio::sync::Mutex;

/// MySQL database backend
pub struct MySqlBackend {
    conn: Mutex<MySqlConnection>,
    dialect: MySqlDialect,
}

impl MySqlBackend {
    /// Connect using the host, credentials and schema in `config`
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        let options = connect_options(config)?;
        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", config.describe(), e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
            dialect: MySqlDialect::new(),
        })
    }

    async fn raw(&self, sql: &str) -> DbResult<()> {
        let mut conn = self.conn.lock().await;
        (&mut *conn).execute(sql).await?;
        Ok(())
    }
}

/// Build connection options; the password is resolved here, never logged.
pub(crate) fn connect_options(config: &DatabaseConfig) -> DbResult<MySqlConnectOptions> {
    config.validate("mysql")?;
    let mut options = MySqlConnectOptions::new()
        .host(config.host.as_deref().unwrap_or("localhost"))
        .port(config.port)
        .username(config.user.as_deref().unwrap_or_default())
        .charset("utf8mb4");
    if let Some(database) = config.database.as_deref() {
        options = options.database(database);
    }
    if let Some(password) = config.resolve_password()? {
        options = options.password(&password);
    }
    Ok(options)
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &SqlValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(f) if f.is_nan() => query.bind(None::<f64>),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Date(d) => query.bind(*d),
        SqlValue::DateTime(dt) => query.bind(*dt),
    }
}

/// Attach the failing statement to execution errors.
fn statement_error(e: sqlx::Error, sql: &str) -> DbError {
    match DbError::from(e) {
        DbError::ExecutionError(msg) => DbError::ExecutionError(format!("{}: {}", msg, sql)),
        other => other,
    }
}

/// Decode one cell, choosing the Rust type from the column's MySQL type.
fn decode_cell(row: &MySqlRow, idx: usize) -> DbResult<SqlValue> {
    let type_name = row.column(idx).type_info().name();
    let value = match type_name {
        "NULL" => None,
        "BOOLEAN" => row.try_get::<Option<bool>, _>(idx)?.map(SqlValue::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::Int)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row.try_get::<Option<u64>, _>(idx)?.map(|v| {
            i64::try_from(v)
                .map(SqlValue::Int)
                .unwrap_or(SqlValue::Float(v as f64))
        }),
        "FLOAT" => row
            .try_get::<Option<f32>, _>(idx)?
            .map(|v| SqlValue::Float(f64::from(v))),
        "DOUBLE" => row.try_get::<Option<f64>, _>(idx)?.map(SqlValue::Float),
        "DECIMAL" => row
            .try_get::<Option<BigDecimal>, _>(idx)?
            .and_then(|d| d.to_string().parse::<f64>().ok())
            .map(SqlValue::Float),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(SqlValue::Date),
        "DATETIME" | "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(SqlValue::DateTime),
        _ => match row.try_get::<Option<String>, _>(idx) {
            Ok(text) => text.map(SqlValue::Text),
            Err(_) => row
                .try_get::<Option<Vec<u8>>, _>(idx)?
                .map(|bytes| SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())),
        },
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

#[async_trait]
impl Database for MySqlBackend {
    async fn query(&self, sql: &str) -> DbResult<Table> {
        let mut conn = self.conn.lock().await;
        let rows: Vec<MySqlRow> = sqlx::query(sql).fetch_all(&mut *conn).await?;

        let columns: Vec<String> = match rows.first() {
            Some(first) => first.columns().iter().map(|c| c.name().to_string()).collect(),
            // No rows to read a header from; ask the server for the statement's shape.
            None => (&mut *conn)
                .prepare(sql)
                .await?
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
        };

        let mut table = Table::new("result", columns);
        for row in &rows {
            let values = (0..row.len())
                .map(|i| decode_cell(row, i))
                .collect::<DbResult<Vec<_>>>()?;
            table
                .push_row(values)
                .map_err(|e| DbError::Internal(e.to_string()))?;
        }
        Ok(table)
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        let mut conn = self.conn.lock().await;
        let query = params.iter().fold(sqlx::query(sql), bind_value);
        let result = query
            .execute(&mut *conn)
            .await
            .map_err(|e| statement_error(e, sql))?;
        Ok(result.rows_affected() as usize)
    }

    // sqlx keeps the prepared statement cached on the connection, so every
    // row after the first reuses it.
    async fn execute_many(&self, sql: &str, rows: &[Vec<SqlValue>]) -> DbResult<usize> {
        let mut conn = self.conn.lock().await;
        let mut affected = 0;
        for params in rows {
            let query = params.iter().fold(sqlx::query(sql), bind_value);
            let result = query
                .execute(&mut *conn)
                .await
                .map_err(|e| statement_error(e, sql))?;
            affected += result.rows_affected() as usize;
        }
        Ok(affected)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.raw(sql).await
    }

    async fn begin(&self) -> DbResult<()> {
        self.raw(self.dialect.begin_transaction())
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))
    }

    async fn commit(&self) -> DbResult<()> {
        self.raw("COMMIT")
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))
    }

    async fn rollback(&self) -> DbResult<()> {
        self.raw("ROLLBACK")
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let mut conn = self.conn.lock().await;
        let (schema_filter, table) = match name.rfind('.') {
            Some(pos) => (Some(&name[..pos]), &name[pos + 1..]),
            None => (None, name),
        };
        let count: i64 = match schema_filter {
            Some(schema) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM information_schema.tables \
                     WHERE table_schema = ? AND table_name = ?",
                )
                .bind(schema)
                .bind(table)
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM information_schema.tables \
                     WHERE table_schema = DATABASE() AND table_name = ?",
                )
                .bind(table)
                .fetch_one(&mut *conn)
                .await?
            }
        };
        Ok(count > 0)
    }

    fn dialect(&self) -> &dyn SqlDialect {
        &self.dialect
    }

    fn db_type(&self) -> DbType {
        DbType::MySql
    }
}

#[cfg(test)]
#[path = "mysql_test.rs"]
mod tests;
