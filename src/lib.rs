//! shared_ip_heatmap library: shared IP address collection and geolocation
//!
//! This library finds IP addresses used by more than one account in an
//! identity provider's session store, geolocates each of them through an
//! ipinfo-compatible lookup service, and keeps the results in a SQLite
//! database for reporting.
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use shared_ip_heatmap::{run_pipeline, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::parse_from([
//!     "shared_ip_heatmap",
//!     "--realm-id", "my-realm",
//!     "--session-db-url", "postgres://keycloak@localhost/keycloak",
//!     "--once",
//! ]);
//! run_pipeline(config, CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

mod aggregate;
mod app;
pub mod config;
pub mod error_handling;
mod geolocation;
pub mod initialization;
mod scheduler;
mod sessions;
mod status_server;
pub mod storage;

// Re-export public API
pub use aggregate::{Aggregator, CollectionReport};
pub use app::cancel_on_shutdown_signal;
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{FailureKind, PipelineStats};
pub use geolocation::{
    parse_location, Coordinates, Enricher, EnricherSettings, EnrichmentReport, GeoLocator,
    IpInfoLocator,
};
pub use run::run_pipeline;
pub use scheduler::{Scheduler, SchedulerSettings};
pub use sessions::{extract_address, PostgresSessionSource, SessionRow, SessionSource};
pub use storage::{run_migrations, AddressRecord, RecordStore, ReportReader, StoreStats};

// Internal run module (wires the components together)
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::{error, info};
    use tokio_util::sync::CancellationToken;

    use crate::aggregate::Aggregator;
    use crate::config::Config;
    use crate::error_handling::PipelineStats;
    use crate::geolocation::{Enricher, EnricherSettings, IpInfoLocator};
    use crate::initialization::init_client;
    use crate::scheduler::{Scheduler, SchedulerSettings};
    use crate::sessions::PostgresSessionSource;
    use crate::status_server::{start_status_server, StatusState};
    use crate::storage::{
        init_db_pool_with_path, init_read_only_pool, run_migrations, RecordStore, ReportReader,
    };

    /// Runs the collection/enrichment pipeline with the provided configuration.
    ///
    /// Opens (and migrates) the local database, then either runs one
    /// collection + resolution pass (`config.once`) or the scheduler loop
    /// until `cancel` fires. When `config.status_port` is set, a read-only
    /// report server runs alongside.
    ///
    /// # Errors
    ///
    /// Startup failures are fatal: the database cannot be opened or migrated,
    /// the session database URL is invalid, or the HTTP client cannot be built.
    /// Failures inside passes are logged and retried by the scheduler.
    pub async fn run_pipeline(config: Config, cancel: CancellationToken) -> Result<()> {
        let pool = init_db_pool_with_path(&config.db_path)
            .await
            .context("Failed to initialize database")?;
        run_migrations(&pool)
            .await
            .context("Failed to initialize database schema")?;
        let store = RecordStore::new(pool);
        info!("Record store ready at {}", config.db_path.display());

        let source = PostgresSessionSource::new(
            &config.session_db_url,
            config.session_db_schema.as_deref(),
            config.realm_id.clone(),
            config.session_query_timeout(),
        )
        .context("Failed to configure session source")?;

        let client = init_client(config.geolocation_timeout())
            .context("Failed to initialize HTTP client")?;
        let locator = IpInfoLocator::new(
            client,
            config.geolocation_base_url.clone(),
            config.geolocation_token.clone(),
            config.geolocation_timeout(),
        );

        let stats = Arc::new(PipelineStats::new());
        let scheduler = Scheduler::new(
            Aggregator::new(source, store.clone()),
            Enricher::new(
                locator,
                store,
                EnricherSettings {
                    lookup_timeout: config.geolocation_timeout(),
                    min_spacing: config.lookup_spacing(),
                },
            ),
            SchedulerSettings {
                collection_interval: config.collection_interval(),
                poll_interval: config.poll_interval(),
            },
            Arc::clone(&stats),
        );

        let status_host = config.status_host;
        let status_task = match config.status_port {
            Some(port) => {
                let reader = ReportReader::new(
                    init_read_only_pool(&config.db_path)
                        .await
                        .context("Failed to open read-only database for status server")?,
                );
                let state = StatusState::new(reader, Arc::clone(&stats));
                let server_cancel = cancel.clone();
                Some(tokio::spawn(async move {
                    if let Err(e) = start_status_server(status_host, port, state, server_cancel).await {
                        error!("{e}");
                    }
                }))
            }
            None => None,
        };

        if config.once {
            scheduler.run_once(&cancel).await;
            cancel.cancel();
        } else {
            scheduler.run(cancel.clone()).await;
        }

        if let Some(task) = status_task {
            let _ = task.await;
        }
        Ok(())
    }
}
