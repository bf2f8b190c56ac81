//! Collaborator payloads.
//!
//! Results wrap the collaborator's JSON body unchanged. The solver reads only
//! the fields its branching needs (`search_stats.total_found`, `approved`)
//! through accessors, so whatever the collaborator sent is what gets stored
//! and passed downstream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request sent to the bug locator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocateRequest {
    pub bug_description: String,
    pub repository_name: Option<String>,
    pub similarity_threshold: f64,
    pub max_results: usize,
}

/// Locator output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocateResult(pub Value);

impl LocateResult {
    /// `search_stats.total_found`; absent or non-numeric reads as 0.
    pub fn total_found(&self) -> u64 {
        self.0
            .get("search_stats")
            .and_then(|stats| stats.get("total_found"))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    /// Match entries; absent or null reads as empty.
    pub fn matches(&self) -> &[Value] {
        self.0
            .get("matches")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Fix generator output, opaque to the solver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixResult(pub Value);

/// Review gate output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewResult(pub Value);

impl ReviewResult {
    /// A missing or non-boolean `approved` counts as a rejection.
    pub fn approved(&self) -> bool {
        self.0
            .get("approved")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Patch applier output, opaque to the solver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchResult(pub Value);

/// Request sent to the repository indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRequest {
    pub repo_path: String,
    pub repo_name: String,
}

/// Repository indexer output, opaque to the solver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexResult(pub Value);
