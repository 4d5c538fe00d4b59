//! Graceful shutdown handling.

use log::{info, warn};
use tokio_util::sync::CancellationToken;

/// Cancels `cancel` on Ctrl-C or, on Unix, SIGTERM.
///
/// The scheduler stops between lookups or during a sleep. A collection pass
/// already in progress runs all of its upserts before the scheduler returns.
pub async fn cancel_on_shutdown_signal(cancel: CancellationToken) {
    wait_for_signal().await;
    info!("Shutdown requested, finishing current work...");
    cancel.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {e}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
