use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::api::requests::{DebugRequest, IndexRepositoryRequest};
use crate::server::AppState;
use crate::workflow::types::WorkflowRecord;
use crate::workflow::SolverInfo;

/// The workflow runs in its own task, so it finishes and lands in history
/// even if the client gives up waiting.
pub async fn handle_debug(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DebugRequest>,
) -> Result<Json<WorkflowRecord>, StatusCode> {
    let auto_edit_mode = request
        .auto_edit_mode
        .unwrap_or(state.config.solver.auto_edit_mode);

    tracing::info!(
        repo = ?request.repository(),
        auto_edit_mode,
        "Received debug request"
    );

    let run = tokio::spawn(async move {
        state
            .solver
            .run(&request.bug_description, request.repository(), auto_edit_mode)
            .await
    });

    match run.await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            tracing::error!(error = %e, "Debug workflow task failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn handle_index(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IndexRepositoryRequest>,
) -> Json<Value> {
    tracing::info!(repo = %request.repo_name, path = %request.repo_path, "Received index request");

    Json(
        state
            .solver
            .index_repository(&request.repo_path, &request.repo_name)
            .await,
    )
}

pub async fn list_history(State(state): State<Arc<AppState>>) -> Json<Vec<WorkflowRecord>> {
    Json(state.solver.history().await)
}

pub async fn clear_history(State(state): State<Arc<AppState>>) -> StatusCode {
    state.solver.clear_history().await;
    StatusCode::NO_CONTENT
}

pub async fn solver_info(State(state): State<Arc<AppState>>) -> Json<SolverInfo> {
    Json(state.solver.info().await)
}
