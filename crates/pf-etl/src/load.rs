//! Loading: write star-schema tables into the warehouse.
//!
//! Each table loads in its own transaction. A failure is rolled back,
//! recorded in the report and the next table is attempted.

use pf_core::{LoadStrategy, SqlValue, Table};
use pf_db::Database;
use pf_sql::QuerySet;
use serde::Serialize;

use crate::star::{load_template_name, StarSchema, LOAD_ORDER};

/// Outcome of loading one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableLoad {
    pub table: String,
    pub rows_attempted: usize,
    /// Rows the engine reported as written; ignored duplicates do not count.
    pub rows_inserted: usize,
    pub error: Option<String>,
}

impl TableLoad {
    fn failed(table: &str, rows_attempted: usize, error: String) -> Self {
        Self {
            table: table.to_string(),
            rows_attempted,
            rows_inserted: 0,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of loading a whole star schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub strategy: Option<LoadStrategy>,
    pub tables: Vec<TableLoad>,
}

impl LoadReport {
    pub fn failed(&self) -> impl Iterator<Item = &TableLoad> {
        self.tables.iter().filter(|t| !t.is_ok())
    }

    pub fn is_success(&self) -> bool {
        self.tables.iter().all(TableLoad::is_ok)
    }

    pub fn rows_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.rows_inserted).sum()
    }

    pub fn table(&self, name: &str) -> Option<&TableLoad> {
        self.tables.iter().find(|t| t.table == name)
    }
}

/// Writes tables into one warehouse connection.
pub struct Loader<'a> {
    db: &'a dyn Database,
    queries: &'a QuerySet,
    strategy: LoadStrategy,
}

impl<'a> Loader<'a> {
    pub fn new(db: &'a dyn Database, queries: &'a QuerySet, strategy: LoadStrategy) -> Self {
        Self {
            db,
            queries,
            strategy,
        }
    }

    /// Load every table of `schema` in dependency order.
    ///
    /// With the clean strategy every target table is emptied first.
    pub async fn load(&self, schema: &StarSchema) -> LoadReport {
        if self.strategy == LoadStrategy::Clean {
            self.clear_tables().await;
        }

        let mut report = LoadReport {
            strategy: Some(self.strategy),
            tables: Vec::with_capacity(LOAD_ORDER.len()),
        };
        for table in schema.tables() {
            let name = load_template_name(table.name());
            let result = match self.queries.get(&name) {
                Some(template) => self.load_table(&table, template).await,
                None => {
                    log::warn!("Load template '{}' not found; skipping {}", name, table.name());
                    TableLoad::failed(
                        table.name(),
                        table.len(),
                        format!("load template '{name}' not found"),
                    )
                }
            };
            report.tables.push(result);
        }
        report
    }

    /// Insert every row of `table` with an engine-neutral `template`.
    ///
    /// All rows commit together or not at all. An empty table is a no-op.
    pub async fn load_table(&self, table: &Table, template: &str) -> TableLoad {
        let attempted = table.len();
        if table.is_empty() {
            return TableLoad {
                table: table.name().to_string(),
                rows_attempted: 0,
                rows_inserted: 0,
                error: None,
            };
        }

        let sql = self.db.dialect().adapt_template(template);
        log::debug!("Loading {} rows into {}", attempted, table.name());

        match self.insert_rows(table, &sql).await {
            Ok(inserted) => {
                log::info!(
                    "Loaded {}: {} of {} rows inserted",
                    table.name(),
                    inserted,
                    attempted
                );
                TableLoad {
                    table: table.name().to_string(),
                    rows_attempted: attempted,
                    rows_inserted: inserted,
                    error: None,
                }
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", table.name(), e);
                TableLoad::failed(table.name(), attempted, e.to_string())
            }
        }
    }

    async fn insert_rows(&self, table: &Table, sql: &str) -> pf_db::DbResult<usize> {
        let rows: Vec<Vec<SqlValue>> = table
            .rows()
            .iter()
            .map(|row| row.iter().map(normalize).collect())
            .collect();

        self.db.begin().await?;
        let inserted = match self.db.execute_many(sql, &rows).await {
            Ok(n) => n,
            Err(e) => {
                if let Err(rollback_err) = self.db.rollback().await {
                    log::warn!("Rollback of {} failed: {}", table.name(), rollback_err);
                }
                return Err(e);
            }
        };
        if let Err(e) = self.db.commit().await {
            if let Err(rollback_err) = self.db.rollback().await {
                log::debug!("Rollback after failed commit of {}: {}", table.name(), rollback_err);
            }
            return Err(e);
        }
        Ok(inserted)
    }

    /// Empty every target table, children before parents.
    ///
    /// Errors are logged; a table that cannot be cleared does not stop the
    /// others.
    pub async fn clear_tables(&self) {
        let dialect = self.db.dialect();
        let guard = dialect.foreign_key_guard();

        if let Some((suspend, _)) = guard {
            if let Err(e) = self.db.execute_batch(suspend).await {
                log::warn!("Could not suspend foreign-key checks: {}", e);
            }
        }

        for table in LOAD_ORDER.iter().rev() {
            match self.db.execute_batch(&dialect.clear_table(table)).await {
                Ok(()) => log::debug!("Cleared {}", table),
                Err(e) => log::warn!("Could not clear {}: {}", table, e),
            }
        }

        if let Some((_, resume)) = guard {
            if let Err(e) = self.db.execute_batch(resume).await {
                log::warn!("Could not resume foreign-key checks: {}", e);
            }
        }
    }
}

/// Prepare a value for binding: dates become `YYYY-MM-DD` text and NaN
/// becomes null.
pub fn normalize(value: &SqlValue) -> SqlValue {
    match value {
        v if v.is_null() => SqlValue::Null,
        SqlValue::Date(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
        SqlValue::DateTime(dt) => SqlValue::Text(dt.format("%Y-%m-%d").to_string()),
        other => other.clone(),
    }
}

#[cfg(test)]
#[path = "load_test.rs"]
mod tests;
