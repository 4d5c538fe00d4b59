// Shared test helpers for database setup and fake session sources.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::Path;

use shared_ip_heatmap::error_handling::SessionSourceError;
use shared_ip_heatmap::storage::init_db_pool_with_path;
use shared_ip_heatmap::{run_migrations, RecordStore, SessionRow, SessionSource};

/// Creates a Record Store on a database file with migrations applied.
/// Reuses the file if it already exists.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_store_with_path(db_path: &Path) -> RecordStore {
    let pool = init_db_pool_with_path(db_path)
        .await
        .expect("Failed to create test database");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    RecordStore::new(pool)
}

/// A session row whose payload carries `ip`.
#[allow(dead_code)] // Used by other test files
pub fn session(identity: &str, ip: &str) -> SessionRow {
    SessionRow::new(identity, format!(r#"{{"ipAddress":"{ip}","authMethod":"openid-connect"}}"#))
}

/// Session source returning a fixed set of rows.
#[allow(dead_code)] // Used by other test files
pub struct StaticSessionSource(pub Vec<SessionRow>);

impl SessionSource for StaticSessionSource {
    async fn fetch_sessions(&self) -> Result<Vec<SessionRow>, SessionSourceError> {
        Ok(self.0.clone())
    }
}

/// ipinfo-style JSON body for a location.
#[allow(dead_code)] // Used by other test files
pub fn ipinfo_body(ip: &str, loc: &str) -> String {
    format!(r#"{{"ip":"{ip}","city":"Somewhere","country":"US","loc":"{loc}"}}"#)
}
