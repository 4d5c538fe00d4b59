// storage/queries.rs
// Read queries shared by the writable store and the read-only report view

use sqlx::{Row, SqlitePool};

use super::models::{AddressRecord, StoreStats};
use crate::error_handling::DatabaseError;

/// Rows matching this predicate still need a geolocation lookup.
pub(crate) const PENDING_PREDICATE: &str =
    "geolocation_fetched = 0 OR latitude IS NULL OR longitude IS NULL";

/// Exact complement of [`PENDING_PREDICATE`].
pub(crate) const RESOLVED_PREDICATE: &str =
    "geolocation_fetched = 1 AND latitude IS NOT NULL AND longitude IS NOT NULL";

pub(crate) async fn list_resolved(pool: &SqlitePool) -> Result<Vec<AddressRecord>, DatabaseError> {
    let sql = format!(
        "SELECT ip, user_count, emails, latitude, longitude, geolocation_fetched, last_updated_ms \
         FROM ip_data WHERE {RESOLVED_PREDICATE} \
         ORDER BY user_count DESC, ip ASC"
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter()
        .map(|row| AddressRecord::from_row(row).map_err(DatabaseError::from))
        .collect()
}

/// All totals come from one statement so they describe the same snapshot.
pub(crate) async fn stats(pool: &SqlitePool) -> Result<StoreStats, DatabaseError> {
    let sql = format!(
        "SELECT COUNT(*) AS total_ips, \
                COALESCE(SUM(CASE WHEN {RESOLVED_PREDICATE} THEN 1 ELSE 0 END), 0) AS located_ips, \
                COALESCE(SUM(user_count), 0) AS total_users \
         FROM ip_data"
    );
    let row = sqlx::query(&sql).fetch_one(pool).await?;
    let total_ips: i64 = row.try_get("total_ips")?;
    let located_ips: i64 = row.try_get("located_ips")?;
    let total_users: i64 = row.try_get("total_users")?;

    Ok(StoreStats {
        total_ips,
        located_ips,
        pending_ips: total_ips - located_ips,
        total_users,
    })
}
