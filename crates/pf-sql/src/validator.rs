//! Static checks for query files.
//!
//! Nothing here touches a database. Extraction queries are parsed with the
//! source engine's dialect; load templates are parsed in their neutral form.

use std::fmt;

use pf_core::Entity;
use sqlparser::ast::Statement;

use crate::dialect::{count_placeholders, MySqlDialect, SqlDialect, NEUTRAL_PLACEHOLDER};
use crate::queries::QuerySet;

/// A problem found in one named query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryIssue {
    pub query: String,
    pub problem: String,
}

impl QueryIssue {
    fn new(query: &str, problem: impl Into<String>) -> Self {
        Self {
            query: query.to_string(),
            problem: problem.into(),
        }
    }
}

impl fmt::Display for QueryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.query, self.problem)
    }
}

/// Check that every entity has exactly one parseable SELECT.
pub fn validate_extraction(queries: &QuerySet, dialect: &dyn SqlDialect) -> Vec<QueryIssue> {
    let mut issues = Vec::new();
    for entity in Entity::ALL {
        let name = entity.query_name();
        let Some(sql) = queries.get(name) else {
            issues.push(QueryIssue::new(name, "query is missing"));
            continue;
        };
        match dialect.parse(sql) {
            Ok(statements) => {
                if let Some(problem) = single_select_problem(&statements) {
                    issues.push(QueryIssue::new(name, problem));
                }
            }
            Err(e) => issues.push(QueryIssue::new(name, e.to_string())),
        }
    }
    issues
}

fn single_select_problem(statements: &[Statement]) -> Option<String> {
    match statements {
        [Statement::Query(_)] => None,
        [_] => Some("expected a SELECT statement".to_string()),
        other => Some(format!("expected one statement, found {}", other.len())),
    }
}

/// Check load templates against the column count of each target table.
///
/// `expected` pairs a template name with the number of placeholders it must
/// carry.
pub fn validate_load(queries: &QuerySet, expected: &[(&str, usize)]) -> Vec<QueryIssue> {
    // The neutral template form is MySQL syntax once placeholders become `?`.
    let parser = MySqlDialect::new();
    let mut issues = Vec::new();
    for (name, columns) in expected {
        let Some(template) = queries.get(name) else {
            issues.push(QueryIssue::new(name, "template is missing"));
            continue;
        };

        let found = count_placeholders(template);
        if found != *columns {
            issues.push(QueryIssue::new(
                name,
                format!("expected {columns} placeholders, found {found}"),
            ));
        }

        let sql = template.replace(NEUTRAL_PLACEHOLDER, parser.placeholder());
        match parser.parse(&sql) {
            Ok(statements) => match statements.as_slice() {
                [Statement::Insert(_)] => {}
                [_] => issues.push(QueryIssue::new(name, "expected an INSERT statement")),
                other => issues.push(QueryIssue::new(
                    name,
                    format!("expected one statement, found {}", other.len()),
                )),
            },
            Err(e) => issues.push(QueryIssue::new(name, e.to_string())),
        }
    }
    issues
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
