use crate::domain::model::{
    Approach, FeedbackAck, FeedbackRequest, HealthStatus, ProgramCatalog, RecommendationRequest,
    RecommendationResponse,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn default_k(&self) -> usize;
    fn default_approach(&self) -> Approach;
}

/// The external recommendation API. One call at a time per session; no retries.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResponse>;
    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<FeedbackAck>;
    async fn health(&self) -> Result<HealthStatus>;
    async fn programs(&self) -> Result<ProgramCatalog>;
}
