//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl-C) or, on unix, SIGTERM
//! - Translate the first one into a graceful shutdown
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)

use super::shutdown::Shutdown;

/// Wait for a termination signal, then trigger `shutdown`.
pub async fn wait_for_signal(shutdown: Shutdown) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!(signal = "SIGINT", "Termination signal received"),
        _ = terminate => tracing::info!(signal = "SIGTERM", "Termination signal received"),
    }

    shutdown.trigger();
}
