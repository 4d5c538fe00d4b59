//! Session source backed by the identity provider's Postgres database.

use std::str::FromStr;
use std::time::Duration;

use log::debug;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::Row;

use super::{SessionRow, SessionSource};
use crate::config::SESSION_QUERY;
use crate::error_handling::{InitializationError, SessionSourceError};

/// Reads offline sessions for one realm from Postgres.
///
/// The pool connects lazily, so an unreachable database only fails the
/// collection pass that needs it, never startup.
pub struct PostgresSessionSource {
    pool: PgPool,
    realm_id: String,
    query_timeout: Duration,
}

impl PostgresSessionSource {
    /// Builds a source for `realm_id` from a `postgres://` URL.
    ///
    /// `schema`, when given, becomes the connection's `search_path`.
    pub fn new(
        database_url: &str,
        schema: Option<&str>,
        realm_id: impl Into<String>,
        query_timeout: Duration,
    ) -> Result<Self, InitializationError> {
        let mut options = PgConnectOptions::from_str(database_url)
            .map_err(|e| InitializationError::SessionSourceConfigError(e.to_string()))?;
        if let Some(schema) = schema {
            options = options.options([("search_path", schema)]);
        }

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(query_timeout)
            .connect_lazy_with(options);

        Ok(PostgresSessionSource {
            pool,
            realm_id: realm_id.into(),
            query_timeout,
        })
    }
}

impl SessionSource for PostgresSessionSource {
    async fn fetch_sessions(&self) -> Result<Vec<SessionRow>, SessionSourceError> {
        let query = sqlx::query(SESSION_QUERY)
            .bind(&self.realm_id)
            .fetch_all(&self.pool);

        let rows = tokio::time::timeout(self.query_timeout, query)
            .await
            .map_err(|_| SessionSourceError::Timeout(self.query_timeout))??;

        debug!(
            "Fetched {} sessions for realm {}",
            rows.len(),
            self.realm_id
        );

        rows.iter()
            .map(|row| -> Result<SessionRow, SessionSourceError> {
                Ok(SessionRow {
                    identity: row.try_get("email")?,
                    payload: row.try_get::<Option<String>, _>("data")?.unwrap_or_default(),
                })
            })
            .collect()
    }
}
