pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::http::HttpRecommendationClient;
pub use config::{toml_config::ProfileConfig, CliConfig};
pub use core::{aggregator::PreferenceAggregator, session::RecommendationSession};
pub use domain::model::{Approach, FeedbackType, RecommendationItem, SkillEntry, SkillLevel};
pub use utils::error::{RecsError, Result, RetrievalError};
