use crate::domain::model::{
    FeedbackAck, FeedbackRequest, HealthStatus, ProgramCatalog, RecommendationRequest,
    RecommendationResponse,
};
use crate::domain::ports::{ConfigProvider, RecommendationService};
use crate::utils::error::{RecsError, Result, RetrievalError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// `RecommendationService` over the service's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpRecommendationClient {
    base_url: String,
    client: Client,
}

impl HttpRecommendationClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RetrievalError::Transport)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(
            config.api_endpoint(),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Maps non-success statuses and undecodable bodies onto `RetrievalError`.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await.map_err(RetrievalError::Transport)?;
        tracing::debug!("API response status: {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                body: error_detail(&body),
            }
            .into());
        }

        serde_json::from_str(&body).map_err(|e| {
            RecsError::from(RetrievalError::MalformedResponse {
                message: e.to_string(),
            })
        })
    }
}

/// Prefers the service's `{"detail": ...}` message over the raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").map(|d| match d {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl RecommendationService for HttpRecommendationClient {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResponse> {
        let url = self.url("recommend");
        tracing::debug!(
            "POST {} (k={}, approach={}, interests={} chars)",
            url,
            request.k,
            request.approach,
            request.profile.interests.len()
        );

        let response = self
            .client
            .post(&url)
            .query(&[
                ("k", request.k.to_string()),
                ("approach", request.approach.to_string()),
            ])
            .json(&request.profile)
            .send()
            .await
            .map_err(RetrievalError::Transport)?;

        Self::decode(response).await
    }

    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<FeedbackAck> {
        let url = self.url("feedback");
        tracing::debug!("POST {} (program_id={})", url, feedback.program_id);

        let response = self
            .client
            .post(&url)
            .json(feedback)
            .send()
            .await
            .map_err(RetrievalError::Transport)?;

        Self::decode(response).await
    }

    async fn health(&self) -> Result<HealthStatus> {
        let url = self.url("health");
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(RetrievalError::Transport)?;

        Self::decode(response).await
    }

    async fn programs(&self) -> Result<ProgramCatalog> {
        let url = self.url("programs");
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(RetrievalError::Transport)?;

        Self::decode(response).await
    }
}
