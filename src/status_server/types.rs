//! Status server data structures.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::error_handling::PipelineStats;
use crate::storage::ReportReader;

/// Shared state for the status server.
///
/// Holds only a [`ReportReader`], so nothing served here can write to the
/// Record Store.
#[derive(Clone)]
pub struct StatusState {
    pub reader: ReportReader,
    pub pipeline: Arc<PipelineStats>,
    pub start_time: Arc<Instant>,
}

impl StatusState {
    pub fn new(reader: ReportReader, pipeline: Arc<PipelineStats>) -> Self {
        StatusState {
            reader,
            pipeline,
            start_time: Arc::new(Instant::now()),
        }
    }
}

/// JSON response for `/status`
#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_seconds: f64,
    pub collection_passes: usize,
    pub resolution_passes: usize,
    pub addresses_resolved: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_collection_ms: Option<i64>,
    pub failures: FailureCounts,
}

#[derive(Serialize)]
pub struct FailureCounts {
    pub total: usize,
    /// Keyed by failure kind description
    pub by_kind: BTreeMap<&'static str, usize>,
}

/// JSON error body for store read failures
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
