// storage/models.rs
// Rows of the ip_data table and aggregate statistics

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::config::IDENTITY_SEPARATOR;

/// One shared IP address and its enrichment status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressRecord {
    pub address: String,
    /// Raw number of sessions (identities, repeats included) seen on this address
    pub user_count: i64,
    /// Sorted identities joined with `", "`
    pub identities: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geolocation_resolved: bool,
    /// Unix millis of the last aggregation write
    pub last_updated_ms: i64,
}

impl AddressRecord {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(AddressRecord {
            address: row.try_get("ip")?,
            user_count: row.try_get("user_count")?,
            identities: row.try_get("emails")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            geolocation_resolved: row.try_get::<i64, _>("geolocation_fetched")? != 0,
            last_updated_ms: row.try_get("last_updated_ms")?,
        })
    }

    /// Identities as stored, in sorted order.
    pub fn identity_list(&self) -> Vec<&str> {
        if self.identities.is_empty() {
            return Vec::new();
        }
        self.identities.split(IDENTITY_SEPARATOR).collect()
    }
}

/// Record Store totals.
///
/// `pending_ips` is always `total_ips - located_ips`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StoreStats {
    pub total_ips: i64,
    pub located_ips: i64,
    pub pending_ips: i64,
    pub total_users: i64,
}

/// Serializes identities for storage: the full list, sorted, joined.
///
/// Duplicates are kept so the stored string has exactly `user_count` entries.
pub fn join_identities(identities: &[String]) -> String {
    let mut sorted: Vec<&str> = identities.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(IDENTITY_SEPARATOR)
}
