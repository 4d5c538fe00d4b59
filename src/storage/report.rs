// storage/report.rs
// Read-only view of the Record Store handed to the reporting surface

use sqlx::SqlitePool;

use super::models::{AddressRecord, StoreStats};
use super::queries;
use crate::error_handling::DatabaseError;

/// Read-only access to the Record Store.
///
/// Exposes only the two queries the reporting layer needs. The binary backs it
/// with a pool opened in SQLite read-only mode.
#[derive(Debug, Clone)]
pub struct ReportReader {
    pool: SqlitePool,
}

impl ReportReader {
    pub fn new(pool: SqlitePool) -> Self {
        ReportReader { pool }
    }

    /// Fully resolved records, highest `user_count` first.
    pub async fn list_resolved(&self) -> Result<Vec<AddressRecord>, DatabaseError> {
        queries::list_resolved(&self.pool).await
    }

    pub async fn stats(&self) -> Result<StoreStats, DatabaseError> {
        queries::stats(&self.pool).await
    }
}
