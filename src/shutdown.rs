use std::sync::Arc;

use tokio::signal;

use crate::server::AppState;
use crate::workflow::types::WorkflowStatus;

/// Resolves on SIGINT or SIGTERM.
pub async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

/// Log what this session did. History is in-memory only and is lost here.
pub async fn graceful_shutdown(state: &Arc<AppState>) {
    let history = state.solver.history().await;

    let failed = history
        .iter()
        .filter(|record| record.status == WorkflowStatus::Failed)
        .count();
    let bugs: usize = history.iter().map(|record| record.total_bugs).sum();

    tracing::info!(
        session_id = %state.solver.session_id(),
        workflows = history.len(),
        failed,
        bugs,
        "Shutdown complete, discarding workflow history"
    );
}
