//! Error type definitions.
//!
//! Every error the pipeline can produce maps onto a [`FailureKind`], so callers
//! and tests can branch on the kind of failure instead of on log text.

use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Broad category of a pipeline failure.
///
/// The category decides how much work is abandoned:
/// - `TransientDependency`: the current pass (collection) or the current
///   address (enrichment) is dropped and retried on the next scheduled pass
/// - `DataShape`: only the offending session row is skipped
/// - `Storage`: the current pass fails and the next loop iteration retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureKind {
    TransientDependency,
    DataShape,
    Storage,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::TransientDependency => "transient dependency failure",
            FailureKind::DataShape => "data shape failure",
            FailureKind::Storage => "storage failure",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error parsing the session database connection settings.
    #[error("Session source configuration error: {0}")]
    SessionSourceConfigError(String),
}

/// Error types for Record Store operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A geolocation write targeted an address that has no row.
    #[error("No record exists for address {0}")]
    UnknownAddress(String),
}

impl DatabaseError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::Storage
    }
}

/// Errors reading rows from the external session source.
#[derive(Error, Debug)]
pub enum SessionSourceError {
    /// Connecting to or querying the session database failed.
    #[error("Session source query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// The session query did not finish within the configured timeout.
    #[error("Session source query timed out after {0:?}")]
    Timeout(Duration),
}

impl SessionSourceError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::TransientDependency
    }
}

/// Reasons a session payload yields no usable address.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PayloadError {
    #[error("session payload is not valid JSON")]
    InvalidJson,

    #[error("session payload has no ipAddress field")]
    MissingAddress,

    #[error("session payload ipAddress {0:?} is not an IP address")]
    InvalidAddress(String),

    #[error("session row has no identity")]
    MissingIdentity,
}

impl PayloadError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::DataShape
    }
}

/// Errors from one collection pass.
#[derive(Error, Debug)]
pub enum CollectionError {
    #[error(transparent)]
    Source(#[from] SessionSourceError),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

impl CollectionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CollectionError::Source(e) => e.kind(),
            CollectionError::Storage(e) => e.kind(),
        }
    }
}

/// Errors from a single geolocation lookup.
#[derive(Error, Debug)]
pub enum GeolocationError {
    /// The lookup did not complete within the configured timeout.
    #[error("Geolocation lookup timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-level failure (connect, TLS, body read).
    #[error("Geolocation request failed: {0}")]
    Request(#[from] ReqwestError),

    /// The service answered with a non-2xx status.
    #[error("Geolocation service returned HTTP {0}")]
    Status(u16),

    /// The response body or its `loc` field could not be parsed.
    #[error("Malformed geolocation response: {0}")]
    Malformed(String),

    /// The response did not include a location.
    #[error("Geolocation response has no location")]
    MissingLocation,
}

impl GeolocationError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::TransientDependency
    }
}
