//! Error types for pf-sql

use thiserror::Error;

/// Query file and SQL parsing errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// Query file does not exist (S001)
    #[error("[S001] Query file not found: {path}")]
    ResourceNotFound { path: String },

    /// Query file could not be read (S002)
    #[error("[S002] Failed to read query file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Named query missing from a query file (S003)
    #[error("[S003] Query '{0}' not found")]
    QueryNotFound(String),

    /// SQL parse error (S004)
    #[error("[S004] SQL parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Empty SQL (S005)
    #[error("[S005] SQL is empty")]
    EmptySql,
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
