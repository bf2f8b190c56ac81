use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Local, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::capability::gateway::CapabilityGateway;
use crate::capability::{Capabilities, CapabilityKind};
use crate::config::LocatorConfig;
use crate::error::{AppError, Result};
use crate::splitter;
use crate::workflow::pipeline::BugUnitPipeline;
use crate::workflow::types::{StepName, StepRecord, WorkflowRecord, WorkflowStatus};

/// Hands out workflow ids of the form `unified_debug_{session}_{n}`.
pub struct WorkflowIdGenerator {
    session_id: String,
    invocations: AtomicU64,
}

impl WorkflowIdGenerator {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            invocations: AtomicU64::new(0),
        }
    }

    /// Session id taken from the local wall clock.
    pub fn from_clock() -> Self {
        Self::new(Local::now().format("%Y%m%d_%H%M%S").to_string())
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn next_id(&self) -> String {
        let n = self.invocations.fetch_add(1, Ordering::SeqCst);
        format!("unified_debug_{}_{n}", self.session_id)
    }
}

/// Snapshot of the solver's configuration.
#[derive(Debug, Clone, Serialize)]
pub struct SolverInfo {
    pub session_id: String,
    pub history_len: usize,
    pub tools_available: Vec<CapabilityKind>,
}

/// Runs whole debug workflows: split the report, drive every bug unit
/// through the pipeline in order, and keep a record of each run.
pub struct WorkflowOrchestrator {
    gateway: CapabilityGateway,
    ids: WorkflowIdGenerator,
    history: RwLock<Vec<WorkflowRecord>>,
}

impl WorkflowOrchestrator {
    pub fn new(capabilities: Capabilities, locator: LocatorConfig) -> Self {
        Self::with_id_generator(capabilities, locator, WorkflowIdGenerator::from_clock())
    }

    pub fn with_id_generator(
        capabilities: Capabilities,
        locator: LocatorConfig,
        ids: WorkflowIdGenerator,
    ) -> Self {
        tracing::info!(session_id = %ids.session_id(), "Debug solver initialized");
        Self {
            gateway: CapabilityGateway::new(capabilities, locator),
            ids,
            history: RwLock::new(Vec::new()),
        }
    }

    pub fn session_id(&self) -> &str {
        self.ids.session_id()
    }

    /// Run one debug workflow.
    ///
    /// Never fails: anything that escapes the per-unit isolation is recorded
    /// on the returned record with status `failed`.
    pub async fn run(
        &self,
        bug_description: &str,
        repository_name: Option<&str>,
        auto_edit_mode: bool,
    ) -> WorkflowRecord {
        let mut record = WorkflowRecord::new(
            self.ids.next_id(),
            self.ids.session_id(),
            bug_description,
            repository_name,
            auto_edit_mode,
        );

        tracing::info!(
            workflow_id = %record.workflow_id,
            repo = ?repository_name,
            auto_edit_mode,
            "Starting debug workflow"
        );

        match self.execute(&mut record).await {
            Ok(()) => {
                record.status = WorkflowStatus::Completed;
                tracing::info!(
                    workflow_id = %record.workflow_id,
                    total_bugs = record.total_bugs,
                    "Debug workflow completed"
                );
            }
            Err(e) => {
                tracing::error!(workflow_id = %record.workflow_id, error = %e, "Debug workflow failed");
                record.status = WorkflowStatus::Failed;
                record.error = Some(e.to_string());
            }
        }
        record.end_time = Some(Utc::now());

        self.history.write().await.push(record.clone());
        record
    }

    /// Debug entry point: the workflow record as pretty-printed JSON.
    pub async fn debug_repository_issue(
        &self,
        bug_description: &str,
        repository_name: Option<&str>,
        auto_edit_mode: bool,
    ) -> String {
        let record = self
            .run(bug_description, repository_name, auto_edit_mode)
            .await;

        serde_json::to_string_pretty(&record).unwrap_or_else(|e| {
            json!({
                "workflow_id": record.workflow_id,
                "status": WorkflowStatus::Failed,
                "start_time": record.start_time,
                "end_time": record.end_time,
                "error": format!("failed to serialize workflow record: {e}"),
            })
            .to_string()
        })
    }

    async fn execute(&self, record: &mut WorkflowRecord) -> Result<()> {
        let bugs = self.analyze(record)?;
        record.total_bugs = bugs.len();

        let pipeline = BugUnitPipeline::new(&self.gateway, record.auto_edit_mode);
        let repository_name = record.repository_name.clone();

        // Sequential on purpose: a later unit may build on an earlier patch.
        for (i, bug) in bugs.iter().enumerate() {
            let bug_index = i + 1;
            tracing::info!(
                workflow_id = %record.workflow_id,
                bug_index,
                total = bugs.len(),
                "Processing bug unit"
            );

            let result = pipeline
                .run(
                    bug_index,
                    bug,
                    repository_name.as_deref(),
                    &mut record.tools_used,
                )
                .await;
            record.results.push(result);
            record.bugs_processed = bug_index;
        }

        Ok(())
    }

    fn analyze(&self, record: &mut WorkflowRecord) -> Result<Vec<String>> {
        let mut step = StepRecord::begin(StepName::BugAnalysis);

        if record.bug_description.trim().is_empty() {
            let err = AppError::EmptyReport;
            step.fail(err.to_string());
            record.steps.push(step);
            return Err(err);
        }

        let bugs = splitter::split(&record.bug_description);
        if bugs.len() > 1 {
            tracing::info!(workflow_id = %record.workflow_id, count = bugs.len(), "Detected separate bugs");
        }

        step.bugs_detected = Some(bugs.len());
        step.complete(None);
        record.steps.push(step);
        Ok(bugs)
    }

    /// Indexing entry point. Failures come back as `{success: false, ...}`.
    pub async fn index_repository(&self, repo_path: &str, repo_name: &str) -> Value {
        match self.gateway.index_repository(repo_path, repo_name).await {
            Ok(result) => json!({
                "success": true,
                "result": result,
                "timestamp": Utc::now(),
            }),
            Err(e) => {
                tracing::warn!(repo = repo_name, error = %e, "Repository indexing failed");
                json!({
                    "success": false,
                    "error": e.to_string(),
                    "timestamp": Utc::now(),
                })
            }
        }
    }

    pub async fn history(&self) -> Vec<WorkflowRecord> {
        self.history.read().await.clone()
    }

    pub async fn clear_history(&self) {
        self.history.write().await.clear();
        tracing::info!("Workflow history cleared");
    }

    pub async fn info(&self) -> SolverInfo {
        SolverInfo {
            session_id: self.session_id().to_string(),
            history_len: self.history.read().await.len(),
            tools_available: CapabilityKind::ALL.to_vec(),
        }
    }
}
