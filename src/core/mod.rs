pub mod aggregator;
pub mod session;

pub use crate::domain::model::{RecommendationItem, RecommendationRequest, RecommendationResponse};
pub use crate::domain::ports::{ConfigProvider, RecommendationService};
pub use crate::utils::error::Result;
