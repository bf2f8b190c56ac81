//! Scriptable in-process collaborators for tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::capability::types::*;
use crate::capability::{
    BugLocator, Capabilities, FixGenerator, PatchApplier, RepoIndexer, ReviewGate,
};
use crate::error::{AppError, Result};

#[derive(Default)]
struct Script {
    total_found: u64,
    /// Bugs whose description contains the key report this many matches instead.
    total_found_overrides: Vec<(String, u64)>,
    locate_failures: Vec<(String, String)>,
    fix_failure: Option<String>,
    patch_failure: Option<String>,
    index_failure: Option<String>,
    approve: bool,
    review_delay: Option<Duration>,
}

#[derive(Default)]
struct Log {
    calls: Vec<&'static str>,
    locate_requests: Vec<LocateRequest>,
}

#[derive(Clone)]
pub struct StubCapabilities {
    script: Arc<Mutex<Script>>,
    log: Arc<Mutex<Log>>,
}

impl Default for StubCapabilities {
    fn default() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                total_found: 1,
                approve: true,
                ..Script::default()
            })),
            log: Arc::default(),
        }
    }
}

impl StubCapabilities {
    pub fn with_total_found(self, total: u64) -> Self {
        self.script.lock().unwrap().total_found = total;
        self
    }

    pub fn with_total_found_for(self, needle: &str, total: u64) -> Self {
        self.script
            .lock()
            .unwrap()
            .total_found_overrides
            .push((needle.to_string(), total));
        self
    }

    pub fn failing_locate_for(self, needle: &str, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .locate_failures
            .push((needle.to_string(), message.to_string()));
        self
    }

    pub fn failing_fix(self, message: &str) -> Self {
        self.script.lock().unwrap().fix_failure = Some(message.to_string());
        self
    }

    pub fn failing_patch(self, message: &str) -> Self {
        self.script.lock().unwrap().patch_failure = Some(message.to_string());
        self
    }

    pub fn failing_index(self, message: &str) -> Self {
        self.script.lock().unwrap().index_failure = Some(message.to_string());
        self
    }

    pub fn approving(self, approve: bool) -> Self {
        self.script.lock().unwrap().approve = approve;
        self
    }

    /// Reviews take this long before answering.
    pub fn with_review_delay(self, delay: Duration) -> Self {
        self.script.lock().unwrap().review_delay = Some(delay);
        self
    }

    pub fn into_capabilities(self) -> Capabilities {
        Capabilities::from_shared(Arc::new(self))
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn locate_requests(&self) -> Vec<LocateRequest> {
        self.log.lock().unwrap().locate_requests.clone()
    }

    fn record(&self, call: &'static str) {
        self.log.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl BugLocator for StubCapabilities {
    async fn locate(&self, request: &LocateRequest) -> Result<LocateResult> {
        self.record("locate");
        self.log
            .lock()
            .unwrap()
            .locate_requests
            .push(request.clone());

        let script = self.script.lock().unwrap();
        if let Some((_, message)) = script
            .locate_failures
            .iter()
            .find(|(needle, _)| request.bug_description.contains(needle.as_str()))
        {
            return Err(AppError::capability("bug_locator", message.clone()));
        }

        let total_found = script
            .total_found_overrides
            .iter()
            .find(|(needle, _)| request.bug_description.contains(needle.as_str()))
            .map(|(_, total)| *total)
            .unwrap_or(script.total_found);

        let matches: Vec<Value> = (0..total_found)
            .map(|i| json!({ "file": format!("src/module_{i}.rs"), "score": 0.9 }))
            .collect();

        Ok(LocateResult(json!({
            "matches": matches,
            "search_stats": {
                "total_found": total_found,
                "collection": request.repository_name,
            },
        })))
    }
}

#[async_trait]
impl FixGenerator for StubCapabilities {
    async fn generate_fix(&self, localization: &LocateResult) -> Result<FixResult> {
        self.record("fix");
        if let Some(message) = &self.script.lock().unwrap().fix_failure {
            return Err(AppError::capability("fix_generator", message.clone()));
        }

        Ok(FixResult(json!({
            "files": localization.matches().len(),
            "diff": "--- a\n+++ b\n",
        })))
    }
}

#[async_trait]
impl ReviewGate for StubCapabilities {
    async fn request_approval(&self, _fix: &FixResult) -> Result<ReviewResult> {
        self.record("review");
        let (approved, delay) = {
            let script = self.script.lock().unwrap();
            (script.approve, script.review_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(ReviewResult(json!({ "approved": approved })))
    }
}

#[async_trait]
impl PatchApplier for StubCapabilities {
    async fn apply_patch(&self, fix: &FixResult) -> Result<PatchResult> {
        self.record("patch");
        if let Some(message) = &self.script.lock().unwrap().patch_failure {
            return Err(AppError::capability("patch_applier", message.clone()));
        }

        Ok(PatchResult(json!({
            "applied": true,
            "files": fix.0.get("files").cloned().unwrap_or_default(),
        })))
    }
}

#[async_trait]
impl RepoIndexer for StubCapabilities {
    async fn index_repository(&self, request: &IndexRequest) -> Result<IndexResult> {
        self.record("index");
        if let Some(message) = &self.script.lock().unwrap().index_failure {
            return Err(AppError::capability("repo_indexer", message.clone()));
        }

        Ok(IndexResult(json!({
            "indexed": request.repo_name,
            "path": request.repo_path,
        })))
    }
}
