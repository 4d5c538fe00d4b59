//! Prometheus metrics handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::super::types::StatusState;
use crate::error_handling::FailureKind;

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<StatusState>) -> Response {
    let stats = match state.reader.stats().await {
        Ok(stats) => stats,
        Err(e) => {
            log::error!("Status server failed to read the record store: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response();
        }
    };
    let pipeline = &state.pipeline;

    let metrics = format!(
        r#"# HELP shared_ip_total_ips Shared IP addresses in the record store
# TYPE shared_ip_total_ips gauge
shared_ip_total_ips {}

# HELP shared_ip_located_ips Shared IP addresses with coordinates
# TYPE shared_ip_located_ips gauge
shared_ip_located_ips {}

# HELP shared_ip_pending_ips Shared IP addresses awaiting geolocation
# TYPE shared_ip_pending_ips gauge
shared_ip_pending_ips {}

# HELP shared_ip_total_users Sum of sessions across shared IP addresses
# TYPE shared_ip_total_users gauge
shared_ip_total_users {}

# HELP shared_ip_collection_passes_total Completed collection passes
# TYPE shared_ip_collection_passes_total counter
shared_ip_collection_passes_total {}

# HELP shared_ip_resolved_total Addresses geolocated since start
# TYPE shared_ip_resolved_total counter
shared_ip_resolved_total {}

# HELP shared_ip_failures_total Failures by kind
# TYPE shared_ip_failures_total counter
shared_ip_failures_total{{kind="transient"}} {}
shared_ip_failures_total{{kind="data_shape"}} {}
shared_ip_failures_total{{kind="storage"}} {}
"#,
        stats.total_ips,
        stats.located_ips,
        stats.pending_ips,
        stats.total_users,
        pipeline.collection_passes(),
        pipeline.addresses_resolved(),
        pipeline.get_failure_count(FailureKind::TransientDependency),
        pipeline.get_failure_count(FailureKind::DataShape),
        pipeline.get_failure_count(FailureKind::Storage),
    );

    (StatusCode::OK, metrics).into_response()
}
