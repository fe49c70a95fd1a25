pub mod toml_config;

use crate::domain::model::{Approach, FeedbackType, SkillEntry};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{RecsError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};

#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:8000";

#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "course-recs"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Get course recommendations for a set of skills")
)]
#[derive(Debug, Clone)]
pub struct CliConfig {
    #[cfg_attr(
        feature = "cli",
        arg(long, env = "COURSE_RECS_API", default_value = DEFAULT_API_ENDPOINT)
    )]
    pub api_endpoint: String,

    /// Skill as `name` or `name:level` (level 1-5, default 3)
    #[cfg_attr(feature = "cli", arg(long = "skill", value_delimiter = ','))]
    pub skills: Vec<SkillEntry>,

    /// Number of recommendations to request
    #[cfg_attr(feature = "cli", arg(long, default_value = "5"))]
    pub k: usize,

    /// hybrid, content-based or collaborative
    #[cfg_attr(feature = "cli", arg(long, default_value = "hybrid"))]
    pub approach: Approach,

    #[cfg_attr(feature = "cli", arg(long))]
    pub user_id: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = "30"))]
    pub timeout_seconds: u64,

    /// Write the recommendations to this CSV file
    #[cfg_attr(feature = "cli", arg(long))]
    pub export: Option<String>,

    /// Send feedback on a returned program as `program_id:clicked|accepted|rejected`
    #[cfg_attr(feature = "cli", arg(long))]
    pub feedback: Vec<String>,

    /// Only check the service health
    #[cfg_attr(feature = "cli", arg(long))]
    pub health: bool,

    /// Only list the program catalogue
    #[cfg_attr(feature = "cli", arg(long, conflicts_with = "health"))]
    pub programs: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON lines"))]
    pub log_json: bool,
}

/// Splits `program_id:type` at the last colon.
pub fn parse_feedback_arg(raw: &str) -> Result<(String, FeedbackType)> {
    let (program_id, kind) = raw.rsplit_once(':').ok_or_else(|| {
        RecsError::validation(
            "feedback",
            format!("Expected program_id:type, got '{}'", raw),
        )
    })?;
    validate_non_empty_string("feedback", program_id)?;
    Ok((program_id.trim().to_string(), kind.parse()?))
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn default_k(&self) -> usize {
        self.k
    }

    fn default_approach(&self) -> Approach {
        self.approach
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_endpoint", &self.api_endpoint)?;
        validate_positive_number("k", self.k, 1)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds as usize, 1)?;
        if let Some(user_id) = &self.user_id {
            validate_non_empty_string("user_id", user_id)?;
        }
        if let Some(export) = &self.export {
            validate_non_empty_string("export", export)?;
        }
        for raw in &self.feedback {
            parse_feedback_arg(raw)?;
        }
        Ok(())
    }
}
