//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl+C) or SIGTERM
//! - Let the binary stop the provider cleanly before exiting
//! - Wake the binary when the provider dies on its own
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A handler that cannot be installed is logged and never resolves,
//!   so the other signal still works

use tokio::sync::watch;

use crate::provider::ProviderStatus;

/// Why the binary is shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    Signal,
    Provider(ProviderStatus),
}

/// Resolve on SIGINT/SIGTERM or once the watched provider reaches a
/// terminal status, whichever comes first.
pub async fn shutdown_or_terminal(mut status: watch::Receiver<ProviderStatus>) -> ShutdownReason {
    let terminal = async {
        let reached = status
            .wait_for(ProviderStatus::is_terminal)
            .await
            .map(|s| s.clone());
        match reached {
            Ok(reached) => reached,
            // Provider dropped: only a signal can end the wait.
            Err(_) => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = shutdown_signal() => ShutdownReason::Signal,
        reached = terminal => ShutdownReason::Provider(reached),
    }
}

/// Resolve when the process is asked to shut down.
pub async fn shutdown_signal() {
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
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
