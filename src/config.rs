use serde::Deserialize;

use crate::capability::CapabilityKind;
use crate::error::{AppError, Result};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub capabilities: CapabilitiesConfig,
    #[serde(default)]
    pub locator: LocatorConfig,
    #[serde(default)]
    pub solver: SolverConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Endpoints of the external collaborators.
///
/// URLs are optional at load time: each command only needs the collaborators
/// it calls. [`CapabilitiesConfig::require`] checks a command's set up front,
/// and [`CapabilitiesConfig::endpoint`] is checked again on every call.
#[derive(Debug, Deserialize, Clone)]
pub struct CapabilitiesConfig {
    pub locator_url: Option<String>,
    pub fix_generator_url: Option<String>,
    pub review_url: Option<String>,
    pub patch_url: Option<String>,
    pub indexer_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// A human sits behind the review endpoint, so it gets its own budget.
    #[serde(default = "default_review_timeout_secs")]
    pub review_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocatorConfig {
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SolverConfig {
    /// Skip human review and patch straight away when the caller doesn't say.
    #[serde(default)]
    pub auto_edit_mode: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_review_timeout_secs() -> u64 {
    3600
}

fn default_similarity_threshold() -> f64 {
    0.7
}

fn default_max_results() -> usize {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            locator_url: None,
            fix_generator_url: None,
            review_url: None,
            patch_url: None,
            indexer_url: None,
            timeout_secs: default_timeout_secs(),
            review_timeout_secs: default_review_timeout_secs(),
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            max_results: default_max_results(),
        }
    }
}

impl CapabilitiesConfig {
    /// Config key holding the endpoint of `kind`.
    pub fn key(kind: CapabilityKind) -> &'static str {
        match kind {
            CapabilityKind::BugLocator => "locator_url",
            CapabilityKind::FixGenerator => "fix_generator_url",
            CapabilityKind::HumanReview => "review_url",
            CapabilityKind::PatchApplier => "patch_url",
            CapabilityKind::RepoIndexer => "indexer_url",
        }
    }

    /// Endpoint URL of `kind`, trimmed. Blank counts as unset.
    pub fn endpoint(&self, kind: CapabilityKind) -> Result<&str> {
        let value = match kind {
            CapabilityKind::BugLocator => &self.locator_url,
            CapabilityKind::FixGenerator => &self.fix_generator_url,
            CapabilityKind::HumanReview => &self.review_url,
            CapabilityKind::PatchApplier => &self.patch_url,
            CapabilityKind::RepoIndexer => &self.indexer_url,
        };
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::Config(format!("capabilities.{} is not set", Self::key(kind)))
            })
    }

    /// Fails on the first of `kinds` without an endpoint.
    pub fn require(&self, kinds: &[CapabilityKind]) -> Result<()> {
        kinds.iter().try_for_each(|kind| self.endpoint(*kind).map(|_| ()))
    }
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("unified-debug").required(false));
        }

        // Environment overrides as UNIFIED_DEBUG__SECTION__KEY, e.g. UNIFIED_DEBUG__SERVER__PORT
        builder = builder.add_source(
            config::Environment::with_prefix("UNIFIED_DEBUG")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let config: AppConfig = config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let threshold = self.locator.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AppError::Config(format!(
                "locator.similarity_threshold must be within 0.0..=1.0, got {threshold}"
            )));
        }
        if self.locator.max_results == 0 {
            return Err(AppError::Config(
                "locator.max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
