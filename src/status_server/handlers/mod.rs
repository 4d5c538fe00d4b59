//! Status server HTTP handlers.

mod metrics;
mod report;

pub use metrics::metrics_handler;
pub use report::{ips_handler, stats_handler, status_handler};
