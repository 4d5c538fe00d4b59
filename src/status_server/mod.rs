//! Read-only HTTP reporting server.
//!
//! Provides four endpoints:
//! - `/stats` - Record Store totals (JSON)
//! - `/ips` - resolved addresses, highest user count first (JSON)
//! - `/status` - pipeline progress counters (JSON)
//! - `/metrics` - Prometheus-compatible metrics
//!
//! The server runs in the background and does not block the scheduler.

mod handlers;
mod types;

use std::net::{IpAddr, SocketAddr};

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use handlers::{ips_handler, metrics_handler, stats_handler, status_handler};
pub use types::StatusState;

/// Builds the router for the reporting endpoints.
pub fn status_router(state: StatusState) -> Router {
    Router::new()
        .route("/stats", get(stats_handler))
        .route("/ips", get(ips_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Creates and starts the status server on `host:port`, stopping on `cancel`.
pub async fn start_status_server(
    host: IpAddr,
    port: u16,
    state: StatusState,
    cancel: CancellationToken,
) -> Result<(), anyhow::Error> {
    let addr = SocketAddr::new(host, port);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind status server to {}: {}", addr, e))?;

    log::info!("Status server listening on http://{}/", addr);
    log::info!("  - Stats: http://{}/stats", addr);
    log::info!("  - IPs: http://{}/ips", addr);

    serve(listener, state, cancel).await
}

async fn serve(
    listener: TcpListener,
    state: StatusState,
    cancel: CancellationToken,
) -> Result<(), anyhow::Error> {
    axum::serve(listener, status_router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| anyhow::anyhow!("Status server error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::{FailureKind, PipelineStats};
    use crate::storage::test_helpers::create_test_store;
    use crate::storage::{RecordStore, ReportReader};
    use std::sync::Arc;

    async fn spawn_server(store: &RecordStore, pipeline: Arc<PipelineStats>) -> (String, CancellationToken) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let base = format!("http://{}", listener.local_addr().unwrap());
        let cancel = CancellationToken::new();
        let state = StatusState::new(ReportReader::new(store.pool().clone()), pipeline);
        tokio::spawn(serve(listener, state, cancel.clone()));
        (base, cancel)
    }

    #[tokio::test]
    async fn test_stats_endpoint_on_empty_store() {
        let store = create_test_store().await;
        let (base, cancel) = spawn_server(&store, Arc::new(PipelineStats::new())).await;

        let body: serde_json::Value = reqwest::get(format!("{base}/stats"))
            .await
            .expect("request should succeed")
            .json()
            .await
            .expect("body should be JSON");
        assert_eq!(
            body,
            serde_json::json!({
                "total_ips": 0,
                "located_ips": 0,
                "pending_ips": 0,
                "total_users": 0
            })
        );
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_ips_endpoint_orders_by_user_count() {
        let store = create_test_store().await;
        let two = vec!["a".to_string(), "b".to_string()];
        let three = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        store.upsert("1.1.1.1", 2, &two).await.unwrap();
        store.upsert("2.2.2.2", 3, &three).await.unwrap();
        store.upsert("3.3.3.3", 2, &two).await.unwrap();
        store.set_geolocation("1.1.1.1", 1.0, 2.0).await.unwrap();
        store.set_geolocation("2.2.2.2", 3.0, 4.0).await.unwrap();

        let (base, cancel) = spawn_server(&store, Arc::new(PipelineStats::new())).await;
        let body: Vec<serde_json::Value> = reqwest::get(format!("{base}/ips"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body.len(), 2);
        assert_eq!(body[0]["address"], "2.2.2.2");
        assert_eq!(body[0]["user_count"], 3);
        assert_eq!(body[0]["identities"], "a, b, c");
        assert_eq!(body[1]["address"], "1.1.1.1");
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_status_and_metrics_endpoints() {
        let store = create_test_store().await;
        let pipeline = Arc::new(PipelineStats::new());
        pipeline.record_collection(1_704_067_200_000);
        pipeline.increment_failure(FailureKind::Storage);

        let (base, cancel) = spawn_server(&store, Arc::clone(&pipeline)).await;

        let status: serde_json::Value = reqwest::get(format!("{base}/status"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["collection_passes"], 1);
        assert_eq!(status["last_collection_ms"], 1_704_067_200_000i64);
        assert_eq!(status["failures"]["total"], 1);
        assert_eq!(status["failures"]["by_kind"]["storage failure"], 1);

        let metrics = reqwest::get(format!("{base}/metrics"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(metrics.contains("shared_ip_total_ips 0"));
        assert!(metrics.contains("shared_ip_failures_total{kind=\"storage\"} 1"));
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_store_failure_returns_503() {
        let store = create_test_store().await;
        let (base, cancel) = spawn_server(&store, Arc::new(PipelineStats::new())).await;
        store.pool().close().await;

        let response = reqwest::get(format!("{base}/stats")).await.unwrap();
        assert_eq!(response.status(), 503);
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();
        let store = create_test_store().await;
        let state = StatusState::new(
            ReportReader::new(store.pool().clone()),
            Arc::new(PipelineStats::new()),
        );

        let host: IpAddr = "127.0.0.1".parse().unwrap();
        let err = start_status_server(host, port, state, CancellationToken::new())
            .await
            .expect_err("port is taken");
        assert!(err.to_string().contains("Failed to bind status server"));
    }

    #[tokio::test]
    async fn test_serves_on_configured_host() {
        let port = {
            let free = TcpListener::bind("127.0.0.1:0").await.unwrap();
            free.local_addr().unwrap().port()
        };
        let store = create_test_store().await;
        let state = StatusState::new(
            ReportReader::new(store.pool().clone()),
            Arc::new(PipelineStats::new()),
        );
        let cancel = CancellationToken::new();
        let host: IpAddr = "127.0.0.1".parse().unwrap();
        let server = tokio::spawn(start_status_server(host, port, state, cancel.clone()));

        let mut status = None;
        for _ in 0..50 {
            if let Ok(response) = reqwest::get(format!("http://127.0.0.1:{port}/stats")).await {
                status = Some(response.status());
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(status.map(|s| s.as_u16()), Some(200));

        cancel.cancel();
        server.await.unwrap().unwrap();
    }
}
