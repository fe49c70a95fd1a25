use crate::adapters::http::DEFAULT_TIMEOUT_SECONDS;
use crate::core::aggregator::PreferenceAggregator;
use crate::core::session::RecommendationSession;
use crate::domain::model::{Approach, Grades, SkillEntry, DEFAULT_K};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{RecsError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// A saved user profile: where to send requests and which skills to send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub grades: Option<Grades>,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestConfig {
    pub k: Option<usize>,
    pub approach: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub csv: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"))
}

impl ProfileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn approach(&self) -> Result<Approach> {
        self.request
            .approach
            .as_deref()
            .map_or(Ok(Approach::default()), str::parse)
    }

    pub fn grades(&self) -> Grades {
        self.grades.unwrap_or_default()
    }

    pub fn csv_output(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.csv.as_deref())
    }

    /// Skills in file order; later duplicates are dropped.
    pub fn preferences(&self) -> PreferenceAggregator {
        let mut prefs = PreferenceAggregator::new();
        prefs.extend(&self.skills);
        prefs
    }

    pub fn build_session(&self) -> Result<RecommendationSession> {
        let mut session = RecommendationSession::new(self.default_k(), self.approach()?);
        if let Some(user_id) = &self.request.user_id {
            session = session.with_user_id(user_id.clone());
        }
        if let Some(session_id) = &self.request.session_id {
            session = session.with_session_id(session_id.clone());
        }
        session.set_grades(self.grades())?;
        session.preferences_mut().extend(&self.skills);
        Ok(session)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("api.endpoint", &self.api.endpoint)?;

        if let Some(timeout) = self.api.timeout_seconds {
            validate_positive_number("api.timeout_seconds", timeout as usize, 1)?;
        }
        if let Some(k) = self.request.k {
            validate_positive_number("request.k", k, 1)?;
        }
        if let Some(user_id) = &self.request.user_id {
            validate_non_empty_string("request.user_id", user_id)?;
        }
        self.approach()?;

        let grades = self.grades();
        for (field, value) in [
            ("grades.math", grades.math),
            ("grades.science", grades.science),
            ("grades.language", grades.language),
        ] {
            if let Some(value) = value {
                validate_range(field, value, 0.0, 100.0)?;
            }
        }

        if self.skills.is_empty() {
            return Err(RecsError::config("profile lists no [[skills]]"));
        }
        Ok(())
    }
}

impl ConfigProvider for ProfileConfig {
    fn api_endpoint(&self) -> &str {
        &self.api.endpoint
    }

    fn timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn default_k(&self) -> usize {
        self.request.k.unwrap_or(DEFAULT_K)
    }

    fn default_approach(&self) -> Approach {
        self.approach().unwrap_or_default()
    }
}

impl Validate for ProfileConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_PROFILE: &str = r#"
[api]
endpoint = "http://localhost:8000"

[request]
k = 3
approach = "content"

[grades]
math = 88.0

[[skills]]
name = "Python"
level = 4

[[skills]]
name = "machine learning"
level = 3

[[skills]]
name = "python"
level = 1
"#;

    #[test]
    fn test_parse_basic_profile() {
        let config = ProfileConfig::from_toml_str(BASIC_PROFILE).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.default_k(), 3);
        assert_eq!(config.approach().unwrap(), Approach::ContentBased);
        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.grades().math, Some(88.0));
        assert_eq!(
            config.preferences().to_weighted_query(),
            "python python python python, machine learning machine learning machine learning"
        );
    }

    #[test]
    fn test_build_session_from_profile() {
        let config = ProfileConfig::from_toml_str(BASIC_PROFILE).unwrap();
        let session = config.build_session().unwrap();
        let request = session.build_request().unwrap();

        assert_eq!(request.k, 3);
        assert_eq!(request.approach, Approach::ContentBased);
        assert_eq!(request.profile.math_grade, Some(88.0));
        assert_eq!(session.preferences().len(), 2);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("COURSE_RECS_TEST_ENDPOINT", "https://recs.example.com");

        let toml_content = r#"
[api]
endpoint = "${COURSE_RECS_TEST_ENDPOINT}"

[[skills]]
name = "rust"
level = 2
"#;

        let config = ProfileConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.endpoint, "https://recs.example.com");

        std::env::remove_var("COURSE_RECS_TEST_ENDPOINT");
    }

    #[test]
    fn test_unknown_env_var_left_in_place() {
        let toml_content = r#"
[api]
endpoint = "${COURSE_RECS_SURELY_UNSET_VAR}"
"#;
        let config = ProfileConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.endpoint, "${COURSE_RECS_SURELY_UNSET_VAR}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_level_fails_to_parse() {
        let toml_content = r#"
[api]
endpoint = "http://localhost:8000"

[[skills]]
name = "rust"
level = 7
"#;
        assert!(matches!(
            ProfileConfig::from_toml_str(toml_content),
            Err(RecsError::TomlError(_))
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[api]
endpoint = "http://localhost:8000"

[request]
approach = "random"

[[skills]]
name = "rust"
level = 2
"#;
        let config = ProfileConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let no_skills = ProfileConfig::from_toml_str("[api]\nendpoint = \"http://x.io\"\n").unwrap();
        assert!(matches!(
            no_skills.validate(),
            Err(RecsError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC_PROFILE.as_bytes()).unwrap();

        let config = ProfileConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.skills.len(), 3);
    }
}
