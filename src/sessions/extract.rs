//! Address extraction from opaque session payloads.

use std::net::IpAddr;

use serde_json::Value;

use crate::config::SESSION_ADDRESS_KEY;
use crate::error_handling::PayloadError;

/// Extracts the client IP address from a session payload.
///
/// The payload is a JSON object carrying the address under `ipAddress`. The
/// address is returned in canonical form (e.g. IPv6 compressed), so the same
/// host always groups under one key.
///
/// # Errors
///
/// Returns a [`PayloadError`] if the payload is not JSON, lacks the field, or
/// the field is not a valid IPv4/IPv6 address.
pub fn extract_address(payload: &str) -> Result<String, PayloadError> {
    let data: Value = serde_json::from_str(payload).map_err(|_| PayloadError::InvalidJson)?;
    let raw = match data.get(SESSION_ADDRESS_KEY) {
        Some(Value::String(s)) => s.trim(),
        Some(Value::Null) | None => return Err(PayloadError::MissingAddress),
        Some(other) => return Err(PayloadError::InvalidAddress(other.to_string())),
    };
    if raw.is_empty() {
        return Err(PayloadError::MissingAddress);
    }
    raw.parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| PayloadError::InvalidAddress(raw.to_string()))
}
