use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::handler;
use crate::capability::http::HttpCapabilities;
use crate::capability::Capabilities;
use crate::config::AppConfig;
use crate::workflow::WorkflowOrchestrator;

pub struct AppState {
    pub config: AppConfig,
    pub solver: WorkflowOrchestrator,
}

impl AppState {
    /// Wire the solver to the configured HTTP collaborators.
    pub fn new(config: AppConfig) -> Self {
        let client = HttpCapabilities::new(&config.capabilities);
        let capabilities = Capabilities::from_shared(Arc::new(client));
        Self::with_capabilities(config, capabilities)
    }

    pub fn with_capabilities(config: AppConfig, capabilities: Capabilities) -> Self {
        let solver = WorkflowOrchestrator::new(capabilities, config.locator.clone());
        Self { config, solver }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/debug", post(handler::handle_debug))
        .route("/index", post(handler::handle_index))
        .route(
            "/history",
            get(handler::list_history).delete(handler::clear_history),
        )
        .route("/info", get(handler::solver_info))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::testing::StubCapabilities;
    use serde_json::{json, Value};
    use std::time::Duration;

    async fn spawn_app(stub: StubCapabilities, config: AppConfig) -> String {
        let state = Arc::new(AppState::with_capabilities(config, stub.into_capabilities()));
        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_debug_route_uses_configured_auto_edit_default() {
        let mut config = AppConfig::default();
        config.solver.auto_edit_mode = true;
        let stub = StubCapabilities::default().approving(false);
        let base = spawn_app(stub.clone(), config).await;

        let client = reqwest::Client::new();
        let record: Value = client
            .post(format!("{base}/debug"))
            .json(&json!({ "bug_description": "Notifications arrive twice on Android" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(record["status"], json!("completed"));
        assert_eq!(record["auto_edit_mode"], json!(true));
        assert_eq!(record["results"][0]["status"], json!("completed"));
        assert!(!stub.calls().contains(&"review"));
    }

    #[tokio::test]
    async fn test_debug_workflow_finishes_after_client_gives_up() {
        let stub = StubCapabilities::default().with_review_delay(Duration::from_millis(300));
        let base = spawn_app(stub.clone(), AppConfig::default()).await;

        let impatient = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let sent = impatient
            .post(format!("{base}/debug"))
            .json(&json!({
                "bug_description": "1. Invoice totals ignore discounts\n2. PDF export cuts the last page",
                "auto_edit_mode": false
            }))
            .send()
            .await;
        assert!(sent.is_err());

        let client = reqwest::Client::new();
        let mut history: Vec<Value> = Vec::new();
        for _ in 0..50 {
            history = client
                .get(format!("{base}/history"))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            if !history.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["status"], json!("completed"));
        assert_eq!(history[0]["bugs_processed"], json!(2));
        let patches = stub.calls().iter().filter(|call| **call == "patch").count();
        assert_eq!(patches, 2);
    }

    #[tokio::test]
    async fn test_history_routes() {
        let stub = StubCapabilities::default();
        let base = spawn_app(stub, AppConfig::default()).await;
        let client = reqwest::Client::new();

        client
            .post(format!("{base}/debug"))
            .json(&json!({
                "bug_description": "Calendar export shifts events by one hour",
                "repository_name": "calendar",
                "auto_edit_mode": false
            }))
            .send()
            .await
            .unwrap();

        let history: Vec<Value> = client
            .get(format!("{base}/history"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["repository_name"], json!("calendar"));

        let status = client
            .delete(format!("{base}/history"))
            .send()
            .await
            .unwrap()
            .status();
        assert_eq!(status, reqwest::StatusCode::NO_CONTENT);

        let info: Value = client
            .get(format!("{base}/info"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(info["history_len"], json!(0));
    }

    #[tokio::test]
    async fn test_index_route_reports_failure_as_body() {
        let stub = StubCapabilities::default().failing_index("not a git repository");
        let base = spawn_app(stub, AppConfig::default()).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/index"))
            .json(&json!({ "repo_path": "/tmp/nothing", "repo_name": "nothing" }))
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("not a git repository"));
    }
}
