use serde::Deserialize;

/// Body of `POST /debug`.
#[derive(Debug, Deserialize)]
pub struct DebugRequest {
    pub bug_description: String,
    #[serde(default)]
    pub repository_name: Option<String>,
    /// Falls back to `solver.auto_edit_mode` when omitted.
    #[serde(default)]
    pub auto_edit_mode: Option<bool>,
}

/// Body of `POST /index`.
#[derive(Debug, Deserialize)]
pub struct IndexRepositoryRequest {
    pub repo_path: String,
    pub repo_name: String,
}

impl DebugRequest {
    /// A blank repository name means "no repository".
    pub fn repository(&self) -> Option<&str> {
        self.repository_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
