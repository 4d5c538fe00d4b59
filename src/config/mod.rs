//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (intervals, timeouts, defaults)
//! - Session source and geolocation protocol constants
//! - CLI/environment option parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
