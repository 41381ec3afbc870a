//! Database error types for mb-db.

use mb_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// The operation conflicts with stored data (e.g., a duplicate booking).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Whether this is a not-found lookup.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoResult | Self::Core(CoreError::NotFound { .. })
        )
    }

    /// Whether the actor was refused.
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Core(CoreError::Forbidden(_)))
    }
}
