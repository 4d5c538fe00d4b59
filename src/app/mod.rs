//! Process-level helpers used by the run entry point.

pub mod shutdown;

// Re-export public API
pub use shutdown::cancel_on_shutdown_signal;
