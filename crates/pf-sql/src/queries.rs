//! Named-query files.
//!
//! A query file is plain UTF-8 SQL split into blocks by marker lines. A line
//! whose trimmed form starts with `--` opens a new block; the rest of that
//! line, trimmed, is the block's name. Every following line up to the next
//! marker (or end of file) is the body, newline-joined and trimmed.
//!
//! ```sql
//! -- extract_states
//! SELECT estado_id AS state_id, nombre_estado AS state_name FROM estado;
//! ```
//!
//! There is no escaping: a comment line inside a body starts a new block.

use crate::error::{SqlError, SqlResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Marker that opens a named block.
pub const QUERY_MARKER: &str = "--";

/// Query name to SQL text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySet {
    queries: BTreeMap<String, String>,
}

impl QuerySet {
    /// Read and split a query file.
    pub fn load(path: &Path) -> SqlResult<Self> {
        if !path.exists() {
            return Err(SqlError::ResourceNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| SqlError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self::parse(&content))
    }

    /// Split query-file text into named blocks.
    ///
    /// Lines before the first marker are discarded. A repeated name keeps
    /// the last block.
    pub fn parse(content: &str) -> Self {
        let mut queries = BTreeMap::new();
        let mut current: Option<String> = None;
        let mut body: Vec<&str> = Vec::new();

        for line in content.lines() {
            let trimmed = line.trim();
            if let Some(name) = trimmed.strip_prefix(QUERY_MARKER) {
                if let Some(prev) = current.take() {
                    insert_block(&mut queries, prev, &body);
                }
                body.clear();
                current = Some(name.trim().to_string());
            } else if current.is_some() {
                body.push(line);
            }
        }
        if let Some(prev) = current {
            insert_block(&mut queries, prev, &body);
        }

        Self { queries }
    }

    /// SQL text of a named query.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.queries.get(name).map(String::as_str)
    }

    /// SQL text of a named query, or [`SqlError::QueryNotFound`].
    pub fn require(&self, name: &str) -> SqlResult<&str> {
        self.get(name)
            .ok_or_else(|| SqlError::QueryNotFound(name.to_string()))
    }

    /// Query names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

fn insert_block(queries: &mut BTreeMap<String, String>, name: String, body: &[&str]) {
    let sql = body.join("\n").trim().to_string();
    if queries.insert(name.clone(), sql).is_some() {
        log::warn!("Query '{}' is defined more than once; keeping the last definition", name);
    }
}

#[cfg(test)]
#[path = "queries_test.rs"]
mod tests;
