//! pf-sql - SQL layer for Pmoflow
//!
//! This crate reads named-query files, rewrites engine-neutral statement
//! templates into each target engine's syntax, and statically checks query
//! files with sqlparser-rs before any connection is opened.

pub mod dialect;
pub mod error;
pub mod queries;
pub mod validator;

pub use dialect::{count_placeholders, dialect_for, DuckDbDialect, MySqlDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use queries::QuerySet;
pub use validator::{validate_extraction, validate_load, QueryIssue};
