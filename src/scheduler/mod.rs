//! Scheduler Loop: interval-driven collection and continuous resolution.
//!
//! One logical worker. Collection and resolution never overlap: each
//! iteration optionally collects, always resolves, then sleeps.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{error, info, warn};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::aggregate::{Aggregator, CollectionReport};
use crate::config::{DEFAULT_COLLECTION_INTERVAL_SECS, DEFAULT_POLL_INTERVAL_SECS};
use crate::error_handling::{CollectionError, FailureKind, PipelineStats};
use crate::geolocation::{Enricher, EnrichmentReport, GeoLocator};
use crate::sessions::SessionSource;

/// Cadences of the scheduler loop.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerSettings {
    /// Minimum time between collection passes
    pub collection_interval: Duration,
    /// Sleep after each iteration
    pub poll_interval: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        SchedulerSettings {
            collection_interval: Duration::from_secs(DEFAULT_COLLECTION_INTERVAL_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

/// Drives an [`Aggregator`] and an [`Enricher`] over a shared Record Store.
pub struct Scheduler<S, G> {
    aggregator: Aggregator<S>,
    enricher: Enricher<G>,
    settings: SchedulerSettings,
    stats: Arc<PipelineStats>,
}

impl<S: SessionSource, G: GeoLocator> Scheduler<S, G> {
    pub fn new(
        aggregator: Aggregator<S>,
        enricher: Enricher<G>,
        settings: SchedulerSettings,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Scheduler {
            aggregator,
            enricher,
            settings,
            stats,
        }
    }

    /// Runs until `cancel` fires.
    ///
    /// Starts with one collection and one resolution pass, then loops:
    /// collect when the collection interval has elapsed since the last
    /// collection watermark, always resolve, sleep the poll interval. Pass
    /// failures are logged and counted; the loop itself never fails.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            "Scheduler started (collection every {:?}, poll every {:?})",
            self.settings.collection_interval, self.settings.poll_interval
        );

        self.collect_pass().await;
        let mut last_collection = Instant::now();
        self.resolution_pass(&cancel).await;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let now = Instant::now();
            if now.duration_since(last_collection) >= self.settings.collection_interval {
                self.collect_pass().await;
                last_collection = now;
            }

            self.resolution_pass(&cancel).await;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }

        info!("Scheduler stopped");
    }

    /// One collection pass followed by one resolution pass.
    pub async fn run_once(&self, cancel: &CancellationToken) {
        self.collect_pass().await;
        self.resolution_pass(cancel).await;
    }

    async fn collect_pass(&self) -> Option<CollectionReport> {
        match self.aggregator.collect().await {
            Ok(report) => {
                self.stats
                    .add_failures(FailureKind::DataShape, report.rows_skipped);
                self.stats
                    .record_collection(Utc::now().timestamp_millis());
                Some(report)
            }
            Err(e) => {
                self.stats.increment_failure(e.kind());
                match e {
                    CollectionError::Source(e) => {
                        warn!("Error collecting IP data, retrying next interval: {e}")
                    }
                    CollectionError::Storage(e) => {
                        error!("Storage failure during collection, retrying next interval: {e}")
                    }
                }
                None
            }
        }
    }

    async fn resolution_pass(&self, cancel: &CancellationToken) -> Option<EnrichmentReport> {
        match self.enricher.process_pending(cancel).await {
            Ok(report) => {
                self.stats
                    .add_failures(FailureKind::TransientDependency, report.failed.len());
                self.stats.record_resolution_pass(report.resolved);
                Some(report)
            }
            Err(e) => {
                self.stats.increment_failure(e.kind());
                error!("Storage failure during geolocation, retrying next iteration: {e}");
                None
            }
        }
    }
}
