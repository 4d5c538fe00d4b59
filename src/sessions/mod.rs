//! Session source: raw `(identity, payload)` rows from the identity provider.
//!
//! The aggregator only depends on the [`SessionSource`] trait; the production
//! implementation is [`PostgresSessionSource`].

mod extract;
mod postgres;

use std::future::Future;

use crate::error_handling::SessionSourceError;

pub use extract::extract_address;
pub use postgres::PostgresSessionSource;

/// One session as stored by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    /// Identity label of the session owner (an email); may be absent
    pub identity: Option<String>,
    /// Opaque JSON session document
    pub payload: String,
}

impl SessionRow {
    pub fn new(identity: impl Into<String>, payload: impl Into<String>) -> Self {
        SessionRow {
            identity: Some(identity.into()),
            payload: payload.into(),
        }
    }
}

/// Anything that can list the sessions of the configured scope.
pub trait SessionSource {
    /// Returns every session row, or fails as a whole.
    fn fetch_sessions(
        &self,
    ) -> impl Future<Output = Result<Vec<SessionRow>, SessionSourceError>> + Send;
}
