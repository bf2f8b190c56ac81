use std::future::Future;
use std::time::Instant;

use serde::Serialize;

use crate::capability::types::*;
use crate::capability::{Capabilities, CapabilityKind};
use crate::config::LocatorConfig;
use crate::error::Result;
use crate::workflow::types::{StepName, StepRecord};

/// Uniform call surface over the collaborators.
///
/// Every pipeline call leaves a [`StepRecord`] in the caller's step list,
/// holding the raw result on success or the error text on failure. Errors
/// are always handed back to the caller.
pub struct CapabilityGateway {
    capabilities: Capabilities,
    locator: LocatorConfig,
}

impl CapabilityGateway {
    pub fn new(capabilities: Capabilities, locator: LocatorConfig) -> Self {
        Self {
            capabilities,
            locator,
        }
    }

    pub async fn locate(
        &self,
        bug_description: &str,
        repository_name: Option<&str>,
        steps: &mut Vec<StepRecord>,
    ) -> Result<LocateResult> {
        let request = LocateRequest {
            bug_description: bug_description.to_string(),
            repository_name: repository_name.map(str::to_string),
            similarity_threshold: self.locator.similarity_threshold,
            max_results: self.locator.max_results,
        };

        tracked(
            steps,
            StepName::BugLocalization,
            CapabilityKind::BugLocator,
            self.capabilities.locator.locate(&request),
        )
        .await
    }

    pub async fn generate_fix(
        &self,
        localization: &LocateResult,
        steps: &mut Vec<StepRecord>,
    ) -> Result<FixResult> {
        tracked(
            steps,
            StepName::CodeFixGeneration,
            CapabilityKind::FixGenerator,
            self.capabilities.fix_generator.generate_fix(localization),
        )
        .await
    }

    pub async fn request_review(
        &self,
        fix: &FixResult,
        steps: &mut Vec<StepRecord>,
    ) -> Result<ReviewResult> {
        tracked(
            steps,
            StepName::HumanReview,
            CapabilityKind::HumanReview,
            self.capabilities.review_gate.request_approval(fix),
        )
        .await
    }

    pub async fn apply_patch(
        &self,
        fix: &FixResult,
        steps: &mut Vec<StepRecord>,
    ) -> Result<PatchResult> {
        tracked(
            steps,
            StepName::PatchApplication,
            CapabilityKind::PatchApplier,
            self.capabilities.patch_applier.apply_patch(fix),
        )
        .await
    }

    /// Indexing sits outside the bug pipeline, so no step is recorded.
    pub async fn index_repository(&self, repo_path: &str, repo_name: &str) -> Result<IndexResult> {
        let request = IndexRequest {
            repo_path: repo_path.to_string(),
            repo_name: repo_name.to_string(),
        };

        tracing::info!(capability = %CapabilityKind::RepoIndexer, repo = repo_name, "Indexing repository");
        self.capabilities.indexer.index_repository(&request).await
    }
}

async fn tracked<T, Fut>(
    steps: &mut Vec<StepRecord>,
    step_name: StepName,
    kind: CapabilityKind,
    call: Fut,
) -> Result<T>
where
    T: Serialize,
    Fut: Future<Output = Result<T>>,
{
    let mut step = StepRecord::begin(step_name);
    let started = Instant::now();

    tracing::info!(capability = %kind, "Calling capability");

    let outcome = call.await.and_then(|value| {
        let raw = serde_json::to_value(&value)?;
        Ok((value, raw))
    });

    let outcome = match outcome {
        Ok((value, raw)) => {
            step.complete(Some(raw));
            tracing::info!(
                capability = %kind,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Capability completed"
            );
            Ok(value)
        }
        Err(e) => {
            step.fail(e.to_string());
            tracing::warn!(capability = %kind, error = %e, "Capability failed");
            Err(e)
        }
    };

    steps.push(step);
    outcome
}
