//! Service layer orchestrating database mutations with access checks and audit.
//!
//! `ProgramService` wraps `ProgramDb`. All repository methods are implemented
//! as `impl ProgramService` blocks in [`crate::repos`].

use chrono::{DateTime, Utc};

use crate::ProgramDb;
use crate::error::DatabaseError;

/// Orchestrates database mutations with an audit trail.
///
/// Every mutation method follows this protocol:
/// 1. Check the actor's role against the affected chapter or mentor
/// 2. Load and mutate the domain record, or validate the input
/// 3. Execute SQL (inside a transaction when more than one row changes)
/// 4. Append an audit entry naming the actor
pub struct ProgramService {
    db: ProgramDb,
}

impl ProgramService {
    /// Open a local database and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = ProgramDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `ProgramDb`.
    #[must_use]
    pub const fn from_db(db: ProgramDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ProgramDb {
        &self.db
    }

    pub(crate) fn now() -> DateTime<Utc> {
        Utc::now()
    }
}
