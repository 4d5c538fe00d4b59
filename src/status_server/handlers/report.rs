//! JSON report handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use strum::IntoEnumIterator;

use super::super::types::{ErrorResponse, FailureCounts, StatusResponse, StatusState};
use crate::error_handling::{DatabaseError, FailureKind};

fn store_error(e: DatabaseError) -> Response {
    error!("Status server failed to read the record store: {e}");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// Record Store totals
pub async fn stats_handler(State(state): State<StatusState>) -> Response {
    match state.reader.stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => store_error(e),
    }
}

/// Resolved addresses, highest user count first
pub async fn ips_handler(State(state): State<StatusState>) -> Response {
    match state.reader.list_resolved().await {
        Ok(records) => Json(records).into_response(),
        Err(e) => store_error(e),
    }
}

/// Pipeline progress counters
pub async fn status_handler(State(state): State<StatusState>) -> Response {
    let pipeline = &state.pipeline;
    let by_kind = FailureKind::iter()
        .map(|kind| (kind.as_str(), pipeline.get_failure_count(kind)))
        .collect();

    Json(StatusResponse {
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        collection_passes: pipeline.collection_passes(),
        resolution_passes: pipeline.resolution_passes(),
        addresses_resolved: pipeline.addresses_resolved(),
        last_collection_ms: pipeline.last_collection_ms(),
        failures: FailureCounts {
            total: pipeline.total_failures(),
            by_kind,
        },
    })
    .into_response()
}
