//! Extraction: run every named extraction query against the source.

use pf_core::Entity;
use pf_db::Database;
use pf_sql::QuerySet;

use crate::error::EtlResult;
use crate::snapshot::SourceSnapshot;

/// Run the extraction query of every entity and decode the results.
///
/// An entity whose query is absent from `queries` is skipped with a warning
/// and recorded as missing. A failing query aborts the whole extraction.
pub async fn extract(db: &dyn Database, queries: &QuerySet) -> EtlResult<SourceSnapshot> {
    let mut snapshot = SourceSnapshot::default();

    for entity in Entity::ALL {
        let name = entity.query_name();
        let Some(sql) = queries.get(name) else {
            log::warn!("Query '{}' not found; skipping {}", name, entity);
            snapshot.mark_missing(entity);
            continue;
        };

        log::debug!("Extracting {} with '{}'", entity, name);
        let table = db.query(sql).await?;
        snapshot.insert_table(entity, &table)?;
        log::info!("Extracted {} {} rows", table.len(), entity);
    }

    Ok(snapshot)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
