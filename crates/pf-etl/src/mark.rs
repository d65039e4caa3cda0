//! Incremental marking: flag extracted source rows so the next run skips them.
//!
//! All UPDATEs of one call run in a single transaction on the source
//! connection. Ids are bound in chunks of `chunk_size` per statement.

use pf_core::{MarkTable, MarkingConfig, SqlValue};
use pf_db::{Database, DbResult};
use serde::Serialize;

use crate::error::{EtlError, EtlResult};
use crate::snapshot::SourceSnapshot;

/// Flags written to one source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableMark {
    pub table: String,
    pub ids: usize,
    pub rows_updated: usize,
    pub statements: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkReport {
    pub tables: Vec<TableMark>,
}

impl MarkReport {
    pub fn statements(&self) -> usize {
        self.tables.iter().map(|t| t.statements).sum()
    }

    pub fn rows_updated(&self) -> usize {
        self.tables.iter().map(|t| t.rows_updated).sum()
    }
}

/// Writes extraction flags on the source database.
pub struct Marker<'a> {
    db: &'a dyn Database,
    config: &'a MarkingConfig,
}

impl<'a> Marker<'a> {
    pub fn new(db: &'a dyn Database, config: &'a MarkingConfig) -> Self {
        Self { db, config }
    }

    /// Set the flag on every id extracted for the configured tables.
    ///
    /// Either every flag is written or none is; on failure the transaction
    /// is rolled back and [`EtlError::Marking`] is returned.
    pub async fn mark(&self, snapshot: &SourceSnapshot) -> EtlResult<MarkReport> {
        self.db.begin().await?;
        match self.mark_tables(snapshot).await {
            Ok(report) => {
                self.db.commit().await.map_err(|e| {
                    EtlError::Marking(format!("commit failed: {e}"))
                })?;
                log::info!(
                    "Marked {} rows with {} statements",
                    report.rows_updated(),
                    report.statements()
                );
                Ok(report)
            }
            Err(e) => {
                if let Err(rollback_err) = self.db.rollback().await {
                    log::warn!("Rollback of marking failed: {}", rollback_err);
                }
                Err(EtlError::Marking(e.to_string()))
            }
        }
    }

    async fn mark_tables(&self, snapshot: &SourceSnapshot) -> DbResult<MarkReport> {
        let mut report = MarkReport::default();
        for target in &self.config.tables {
            if snapshot.is_missing(target.entity) {
                log::debug!("{} was not extracted; not marking {}", target.entity, target.table);
                continue;
            }
            let Some(ids) = snapshot.ids(target.entity) else {
                log::warn!("{} has no single key; not marking {}", target.entity, target.table);
                continue;
            };
            report.tables.push(self.mark_table(target, &ids).await?);
        }
        Ok(report)
    }

    async fn mark_table(&self, target: &MarkTable, ids: &[i64]) -> DbResult<TableMark> {
        let mut mark = TableMark {
            table: target.table.clone(),
            ids: ids.len(),
            rows_updated: 0,
            statements: 0,
        };
        let chunk_size = self.config.chunk_size.max(1);
        for chunk in ids.chunks(chunk_size) {
            let sql = format!(
                "UPDATE {} SET {} = 1 WHERE {} IN ({})",
                target.table,
                self.config.flag_column,
                target.id_column,
                self.db.dialect().placeholders(chunk.len())
            );
            let params: Vec<SqlValue> = chunk.iter().map(|&id| SqlValue::Int(id)).collect();
            mark.rows_updated += self.db.execute(&sql, &params).await?;
            mark.statements += 1;
        }
        log::debug!(
            "Flagged {} of {} ids in {}",
            mark.rows_updated,
            mark.ids,
            mark.table
        );
        Ok(mark)
    }

    /// Clear the flag on every configured table, in one transaction.
    ///
    /// Returns the number of rows reset.
    pub async fn reset(&self) -> EtlResult<usize> {
        self.db.begin().await?;
        let mut total = 0;
        for target in &self.config.tables {
            let sql = format!(
                "UPDATE {} SET {} = 0 WHERE {} <> 0",
                target.table, self.config.flag_column, self.config.flag_column
            );
            match self.db.execute(&sql, &[]).await {
                Ok(n) => {
                    log::info!("Reset {} flags in {}", n, target.table);
                    total += n;
                }
                Err(e) => {
                    if let Err(rollback_err) = self.db.rollback().await {
                        log::warn!("Rollback of flag reset failed: {}", rollback_err);
                    }
                    return Err(EtlError::Marking(format!("{}: {e}", target.table)));
                }
            }
        }
        self.db
            .commit()
            .await
            .map_err(|e| EtlError::Marking(format!("commit failed: {e}")))?;
        Ok(total)
    }
}

#[cfg(test)]
#[path = "mark_test.rs"]
mod tests;
