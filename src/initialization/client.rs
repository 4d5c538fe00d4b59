//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::USER_AGENT;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used for geolocation lookups.
///
/// The client-level timeout bounds every lookup, including connect and body
/// read. Rustls is the TLS backend.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(timeout: Duration) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}
