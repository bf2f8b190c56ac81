use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::capability::types::*;
use crate::capability::{
    BugLocator, CapabilityKind, FixGenerator, PatchApplier, RepoIndexer, ReviewGate,
};
use crate::config::CapabilitiesConfig;
use crate::error::{AppError, Result};

/// Reaches every collaborator with a JSON POST to its configured endpoint.
///
/// Endpoints are resolved per call, so a missing URL only fails the
/// capability that needs it.
pub struct HttpCapabilities {
    client: Client,
    config: CapabilitiesConfig,
}

impl HttpCapabilities {
    pub fn new(config: &CapabilitiesConfig) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
        }
    }

    fn timeout(&self, kind: CapabilityKind) -> Duration {
        match kind {
            CapabilityKind::HumanReview => Duration::from_secs(self.config.review_timeout_secs),
            _ => Duration::from_secs(self.config.timeout_secs),
        }
    }

    async fn post<Req, Resp>(&self, kind: CapabilityKind, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self
            .config
            .endpoint(kind)
            .map_err(|e| AppError::capability(kind.name(), e.to_string()))?;

        tracing::debug!(capability = %kind, url = url, "Calling capability endpoint");

        let response = self
            .client
            .post(url)
            .timeout(self.timeout(kind))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::capability(kind.name(), format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => format!("<body unreadable: {e}>"),
            };
            return Err(AppError::capability(
                kind.name(),
                format!("endpoint returned {status}: {body}"),
            ));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| AppError::capability(kind.name(), format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl BugLocator for HttpCapabilities {
    async fn locate(&self, request: &LocateRequest) -> Result<LocateResult> {
        self.post(CapabilityKind::BugLocator, request).await
    }
}

#[async_trait]
impl FixGenerator for HttpCapabilities {
    async fn generate_fix(&self, localization: &LocateResult) -> Result<FixResult> {
        self.post(CapabilityKind::FixGenerator, localization).await
    }
}

#[async_trait]
impl ReviewGate for HttpCapabilities {
    async fn request_approval(&self, fix: &FixResult) -> Result<ReviewResult> {
        self.post(CapabilityKind::HumanReview, fix).await
    }
}

#[async_trait]
impl PatchApplier for HttpCapabilities {
    async fn apply_patch(&self, fix: &FixResult) -> Result<PatchResult> {
        self.post(CapabilityKind::PatchApplier, fix).await
    }
}

#[async_trait]
impl RepoIndexer for HttpCapabilities {
    async fn index_repository(&self, request: &IndexRequest) -> Result<IndexResult> {
        self.post(CapabilityKind::RepoIndexer, request).await
    }
}
