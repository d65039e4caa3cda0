//! Error types for pf-etl

use pf_core::{CoreError, Entity};
use pf_db::DbError;
use pf_sql::SqlError;
use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum EtlError {
    /// Query file or query text problem (T001)
    #[error("[T001] {0}")]
    Sql(#[from] SqlError),

    /// Database failure (T002)
    #[error("[T002] {0}")]
    Db(#[from] DbError),

    /// Configuration problem (T003)
    #[error("[T003] {0}")]
    Core(#[from] CoreError),

    /// Extracted row could not be decoded (T004)
    #[error("[T004] Cannot decode {entity} row {row}: {message}")]
    Decode {
        entity: Entity,
        row: usize,
        message: String,
    },

    /// Marking was rolled back (T005)
    #[error("[T005] Marking rolled back: {0}")]
    Marking(String),
}

/// Result type alias for EtlError
pub type EtlResult<T> = Result<T, EtlError>;
