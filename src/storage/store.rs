//! The Record Store: durable per-address aggregates and enrichment status.
//!
//! Every write is a single SQL statement, so a concurrent reader sees either
//! the old or the new version of a row. Geolocation columns are written only
//! by [`RecordStore::set_geolocation`]; [`RecordStore::upsert`] never touches
//! them.

use chrono::Utc;
use log::debug;
use sqlx::{Row, SqlitePool};

use super::models::{join_identities, AddressRecord, StoreStats};
use super::queries::{self, PENDING_PREDICATE};
use crate::error_handling::DatabaseError;

/// Writable handle on the `ip_data` table.
///
/// Cloning is cheap; clones share the underlying pool.
#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Wraps a pool whose schema has already been migrated.
    pub fn new(pool: SqlitePool) -> Self {
        RecordStore { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Inserts the address or refreshes its aggregate columns.
    ///
    /// On conflict only `user_count`, `emails` and `last_updated_ms` change.
    pub async fn upsert(
        &self,
        address: &str,
        user_count: usize,
        identities: &[String],
    ) -> Result<(), DatabaseError> {
        let emails = join_identities(identities);
        let now_ms = Utc::now().timestamp_millis();

        sqlx::query(
            "INSERT INTO ip_data (ip, user_count, emails, last_updated_ms)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(ip) DO UPDATE SET
                 user_count = excluded.user_count,
                 emails = excluded.emails,
                 last_updated_ms = excluded.last_updated_ms",
        )
        .bind(address)
        .bind(user_count as i64)
        .bind(&emails)
        .bind(now_ms)
        .execute(&self.pool)
        .await?;

        debug!("Upserted {address} with {user_count} sessions");
        Ok(())
    }

    /// Stores coordinates for an existing address and marks it resolved.
    ///
    /// Returns [`DatabaseError::UnknownAddress`] if no row matched.
    pub async fn set_geolocation(
        &self,
        address: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE ip_data
             SET latitude = ?, longitude = ?, geolocation_fetched = 1
             WHERE ip = ?",
        )
        .bind(latitude)
        .bind(longitude)
        .bind(address)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::UnknownAddress(address.to_string()));
        }
        Ok(())
    }

    /// Addresses that still need a geolocation lookup, ordered by address.
    pub async fn list_unresolved(&self) -> Result<Vec<String>, DatabaseError> {
        let sql = format!("SELECT ip FROM ip_data WHERE {PENDING_PREDICATE} ORDER BY ip ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("ip").map_err(DatabaseError::from))
            .collect()
    }

    /// Fully resolved records, highest `user_count` first.
    pub async fn list_resolved(&self) -> Result<Vec<AddressRecord>, DatabaseError> {
        queries::list_resolved(&self.pool).await
    }

    pub async fn stats(&self) -> Result<StoreStats, DatabaseError> {
        queries::stats(&self.pool).await
    }

    /// Looks up a single record.
    pub async fn get(&self, address: &str) -> Result<Option<AddressRecord>, DatabaseError> {
        let row = sqlx::query(
            "SELECT ip, user_count, emails, latitude, longitude, geolocation_fetched, last_updated_ms
             FROM ip_data WHERE ip = ?",
        )
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(AddressRecord::from_row)
            .transpose()
            .map_err(DatabaseError::from)
    }
}
