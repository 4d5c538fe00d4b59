//! Geolocation Enricher: resolves pending addresses one per spacing interval.

use std::time::Duration;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use super::{Coordinates, GeoLocator};
use crate::config::{DEFAULT_GEOLOCATION_TIMEOUT_SECS, DEFAULT_LOOKUP_SPACING};
use crate::error_handling::{DatabaseError, GeolocationError};
use crate::storage::RecordStore;

/// Timing limits for a resolution pass.
#[derive(Debug, Clone, Copy)]
pub struct EnricherSettings {
    /// Upper bound on a single lookup
    pub lookup_timeout: Duration,
    /// Minimum gap between the end of one lookup and the start of the next
    pub min_spacing: Duration,
}

impl Default for EnricherSettings {
    fn default() -> Self {
        EnricherSettings {
            lookup_timeout: Duration::from_secs(DEFAULT_GEOLOCATION_TIMEOUT_SECS),
            min_spacing: DEFAULT_LOOKUP_SPACING,
        }
    }
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// Lookups started
    pub attempted: usize,
    /// Addresses that now have coordinates
    pub resolved: usize,
    /// Addresses left pending after a failed lookup, in pass order
    pub failed: Vec<String>,
    /// The pass stopped early because shutdown was requested
    pub cancelled: bool,
}

/// Resolves pending Record Store rows through a [`GeoLocator`].
pub struct Enricher<G> {
    locator: G,
    store: RecordStore,
    settings: EnricherSettings,
}

impl<G: GeoLocator> Enricher<G> {
    pub fn new(locator: G, store: RecordStore, settings: EnricherSettings) -> Self {
        Enricher {
            locator,
            store,
            settings,
        }
    }

    /// Runs one resolution pass over every pending address.
    ///
    /// Lookups are strictly sequential and separated by
    /// [`EnricherSettings::min_spacing`] (no wait after the last one). A failed
    /// lookup leaves its address pending and the pass moves on. Cancellation is
    /// honoured between lookups and during the spacing wait.
    ///
    /// # Errors
    ///
    /// Only storage failures end the pass early with an error.
    pub async fn process_pending(
        &self,
        cancel: &CancellationToken,
    ) -> Result<EnrichmentReport, DatabaseError> {
        let pending = self.store.list_unresolved().await?;
        let mut report = EnrichmentReport::default();

        if pending.is_empty() {
            info!("No pending geolocations");
            return Ok(report);
        }

        let total = pending.len();
        info!("Processing {total} pending geolocations...");

        for (i, address) in pending.iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            info!("Fetching {address} ({}/{total})", i + 1);
            report.attempted += 1;

            match self.lookup(address).await {
                Ok(coords) => {
                    match self
                        .store
                        .set_geolocation(address, coords.latitude, coords.longitude)
                        .await
                    {
                        Ok(()) => {
                            info!(
                                "✓ {address} -> ({}, {})",
                                coords.latitude, coords.longitude
                            );
                            report.resolved += 1;
                        }
                        Err(DatabaseError::UnknownAddress(_)) => {
                            warn!("✗ {address} -> record disappeared before it could be updated");
                            report.failed.push(address.clone());
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(e) => {
                    warn!("✗ {address} -> {e}");
                    report.failed.push(address.clone());
                }
            }

            if i + 1 < total {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        report.cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.settings.min_spacing) => {}
                }
            }
        }

        info!(
            "Geolocation processing complete: {} resolved, {} failed",
            report.resolved,
            report.failed.len()
        );
        Ok(report)
    }

    async fn lookup(&self, address: &str) -> Result<Coordinates, GeolocationError> {
        tokio::time::timeout(self.settings.lookup_timeout, self.locator.locate(address))
            .await
            .map_err(|_| GeolocationError::Timeout(self.settings.lookup_timeout))?
    }
}
