pub mod gateway;
pub mod http;
pub mod types;

#[cfg(test)]
pub mod testing;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use types::*;

/// The external collaborators the solver drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    BugLocator,
    FixGenerator,
    HumanReview,
    PatchApplier,
    RepoIndexer,
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 5] = [
        CapabilityKind::BugLocator,
        CapabilityKind::FixGenerator,
        CapabilityKind::HumanReview,
        CapabilityKind::PatchApplier,
        CapabilityKind::RepoIndexer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CapabilityKind::BugLocator => "bug_locator",
            CapabilityKind::FixGenerator => "fix_generator",
            CapabilityKind::HumanReview => "human_review",
            CapabilityKind::PatchApplier => "patch_applier",
            CapabilityKind::RepoIndexer => "repo_indexer",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[async_trait]
pub trait BugLocator: Send + Sync {
    /// Find source locations relevant to a bug description.
    async fn locate(&self, request: &LocateRequest) -> Result<LocateResult>;
}

#[async_trait]
pub trait FixGenerator: Send + Sync {
    /// Produce a candidate fix from the locator's findings.
    async fn generate_fix(&self, localization: &LocateResult) -> Result<FixResult>;
}

#[async_trait]
pub trait ReviewGate: Send + Sync {
    /// Ask a human to approve or reject a candidate fix.
    async fn request_approval(&self, fix: &FixResult) -> Result<ReviewResult>;
}

#[async_trait]
pub trait PatchApplier: Send + Sync {
    async fn apply_patch(&self, fix: &FixResult) -> Result<PatchResult>;
}

#[async_trait]
pub trait RepoIndexer: Send + Sync {
    /// Build the search index the locator queries.
    async fn index_repository(&self, request: &IndexRequest) -> Result<IndexResult>;
}

/// One implementation per collaborator, injected into the solver.
#[derive(Clone)]
pub struct Capabilities {
    pub locator: Arc<dyn BugLocator>,
    pub fix_generator: Arc<dyn FixGenerator>,
    pub review_gate: Arc<dyn ReviewGate>,
    pub patch_applier: Arc<dyn PatchApplier>,
    pub indexer: Arc<dyn RepoIndexer>,
}

impl Capabilities {
    /// Route every capability through a single client that implements all of them.
    pub fn from_shared<C>(client: Arc<C>) -> Self
    where
        C: BugLocator + FixGenerator + ReviewGate + PatchApplier + RepoIndexer + 'static,
    {
        Self {
            locator: client.clone(),
            fix_generator: client.clone(),
            review_gate: client.clone(),
            patch_applier: client.clone(),
            indexer: client,
        }
    }
}
