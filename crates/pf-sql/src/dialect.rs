//! SQL dialect abstraction
//!
//! Statement templates in the load query file are written once, in an
//! engine-neutral form: `INSERT IGNORE` as the duplicate-skipping verb and
//! `%s` as the positional placeholder. Each dialect rewrites them into the
//! target engine's syntax and knows how that engine clears a table.

use pf_core::DbType;
use sqlparser::ast::Statement;
use sqlparser::dialect::{
    Dialect, DuckDbDialect as SqlParserDuckDb, MySqlDialect as SqlParserMySql,
};
use sqlparser::parser::Parser;

use crate::error::{SqlError, SqlResult};

/// Engine-neutral duplicate-skipping insert verb used in templates.
pub const NEUTRAL_IGNORE_VERB: &str = "INSERT IGNORE";

/// Engine-neutral positional placeholder used in templates.
pub const NEUTRAL_PLACEHOLDER: &str = "%s";

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Parse SQL into AST statements
    fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }
        Parser::parse_sql(self.parser_dialect(), sql).map_err(|e| {
            let msg = e.to_string();
            let (line, column) = parse_location_from_error(&msg);
            SqlError::ParseError {
                message: msg,
                line,
                column,
            }
        })
    }

    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Insert verb that skips rows colliding with an existing key
    fn insert_ignore_verb(&self) -> &'static str;

    /// Positional parameter marker understood by the driver
    fn placeholder(&self) -> &'static str {
        "?"
    }

    /// Statement that opens a transaction
    fn begin_transaction(&self) -> &'static str;

    /// Statement that removes every row of `table`
    fn clear_table(&self, table: &str) -> String;

    /// Statements wrapped around table clearing to suspend foreign-key checks
    fn foreign_key_guard(&self) -> Option<(&'static str, &'static str)> {
        None
    }

    /// Rewrite an engine-neutral template into this dialect.
    fn adapt_template(&self, template: &str) -> String {
        let with_verb = replace_ignore_case(template, NEUTRAL_IGNORE_VERB, self.insert_ignore_verb());
        with_verb.replace(NEUTRAL_PLACEHOLDER, self.placeholder())
    }

    /// Comma-separated list of `n` placeholders, for `IN (...)` clauses.
    fn placeholders(&self, n: usize) -> String {
        vec![self.placeholder(); n].join(", ")
    }
}

/// Dialect for a configured engine.
pub fn dialect_for(db_type: DbType) -> Box<dyn SqlDialect> {
    match db_type {
        DbType::DuckDb => Box::new(DuckDbDialect::new()),
        DbType::MySql => Box::new(MySqlDialect::new()),
    }
}

/// Number of engine-neutral placeholders in a template.
pub fn count_placeholders(template: &str) -> usize {
    template.matches(NEUTRAL_PLACEHOLDER).count()
}

/// Replace every ASCII-case-insensitive occurrence of `needle`.
fn replace_ignore_case(haystack: &str, needle: &str, replacement: &str) -> String {
    let lower_hay = haystack.to_ascii_lowercase();
    let lower_needle = needle.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (idx, _) in lower_hay.match_indices(&lower_needle) {
        out.push_str(&haystack[last..idx]);
        out.push_str(replacement);
        last = idx + needle.len();
    }
    out.push_str(&haystack[last..]);
    out
}

/// Parse line and column from sqlparser error message.
///
/// sqlparser's `ParserError` is a simple string wrapper with no structured
/// location data, so we extract "Line: N, Column: M" from the error message text.
fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let number_after = |label: &str| -> Option<usize> {
        let start = msg.find(label)? + label.len();
        let digits: String = msg[start..]
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    };
    match (number_after("Line: "), number_after("Column: ")) {
        (Some(line), Some(column)) => (line, column),
        _ => (0, 0),
    }
}

/// DuckDB SQL dialect
pub struct DuckDbDialect {
    dialect: SqlParserDuckDb,
}

impl DuckDbDialect {
    /// Create a new DuckDB dialect
    pub fn new() -> Self {
        Self {
            dialect: SqlParserDuckDb {},
        }
    }
}

impl Default for DuckDbDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for DuckDbDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn insert_ignore_verb(&self) -> &'static str {
        "INSERT OR IGNORE"
    }

    fn begin_transaction(&self) -> &'static str {
        "BEGIN TRANSACTION"
    }

    // DuckDB has no TRUNCATE with FK suspension; tables are cleared child-first.
    fn clear_table(&self, table: &str) -> String {
        format!("DELETE FROM {table}")
    }
}

/// MySQL SQL dialect
pub struct MySqlDialect {
    dialect: SqlParserMySql,
}

impl MySqlDialect {
    /// Create a new MySQL dialect
    pub fn new() -> Self {
        Self {
            dialect: SqlParserMySql {},
        }
    }
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for MySqlDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "mysql"
    }

    fn insert_ignore_verb(&self) -> &'static str {
        "INSERT IGNORE"
    }

    fn begin_transaction(&self) -> &'static str {
        "START TRANSACTION"
    }

    fn clear_table(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {table}")
    }

    fn foreign_key_guard(&self) -> Option<(&'static str, &'static str)> {
        Some(("SET FOREIGN_KEY_CHECKS = 0", "SET FOREIGN_KEY_CHECKS = 1"))
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
