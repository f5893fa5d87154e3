//! OS signal handling.
//!
//! - SIGINT / SIGTERM resolve [`wait_for_terminate`]
//! - SIGHUP forces a config reload through the pipeline (unix only), run on
//!   the blocking pool

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use crate::config::ReloadPipeline;

/// Wait for Ctrl+C or SIGTERM.
pub async fn wait_for_terminate() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Force a reload on every SIGHUP until shutdown.
#[cfg(unix)]
pub fn spawn_reload_on_hangup(
    pipeline: Arc<ReloadPipeline>,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(sig) => sig,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGHUP handler");
                return;
            }
        };
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                received = hangup.recv() => {
                    if received.is_none() {
                        break;
                    }
                    tracing::info!("Received SIGHUP");
                    if let Err(e) = pipeline.force_reload_blocking().await {
                        tracing::error!(error = %e, "Forced reload task failed");
                    }
                }
            }
        }
    })
}

#[cfg(not(unix))]
pub fn spawn_reload_on_hangup(
    _pipeline: Arc<ReloadPipeline>,
    _shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async {})
}
