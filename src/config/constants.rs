//! Configuration constants.
//!
//! Defaults for every tunable in [`Config`](super::Config), plus fixed
//! protocol details of the session source and the geolocation service.

use std::time::Duration;

/// Default seconds between collection passes
pub const DEFAULT_COLLECTION_INTERVAL_SECS: u64 = 3600;
/// Default sleep between scheduler iterations
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
/// Default timeout for the session source query
pub const DEFAULT_SESSION_QUERY_TIMEOUT_SECS: u64 = 30;
/// Default timeout for a single geolocation lookup
pub const DEFAULT_GEOLOCATION_TIMEOUT_SECS: u64 = 10;
/// Minimum spacing between consecutive geolocation lookups.
/// The free ipinfo.io tier tolerates roughly one request per second.
pub const DEFAULT_LOOKUP_SPACING: Duration = Duration::from_secs(1);
/// Lowest accepted `--lookup-spacing-ms`
pub const MIN_LOOKUP_SPACING_MS: u64 = 1000;
pub const DEFAULT_GEOLOCATION_BASE_URL: &str = "https://ipinfo.io";
pub const DB_PATH: &str = "ip_locations.db";
pub const DEFAULT_STATUS_HOST: &str = "0.0.0.0";

pub const USER_AGENT: &str = concat!("shared_ip_heatmap/", env!("CARGO_PKG_VERSION"));

// Session source
/// JSON key holding the client address inside a session payload
pub const SESSION_ADDRESS_KEY: &str = "ipAddress";
/// Offline sessions joined with their owning user, scoped to one realm
pub const SESSION_QUERY: &str = "SELECT u.email, s.data \
     FROM offline_user_session s \
     JOIN user_entity u ON s.user_id = u.id \
     WHERE s.realm_id = $1";

// Record Store
/// Separator between identities in the stored `emails` column
pub const IDENTITY_SEPARATOR: &str = ", ";
