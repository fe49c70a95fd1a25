use crate::utils::error::{RecsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Self-reported experience, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct SkillLevel(u8);

impl SkillLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for SkillLevel {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<i64> for SkillLevel {
    type Error = RecsError;

    fn try_from(value: i64) -> Result<Self> {
        if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
            return Err(RecsError::validation(
                "level",
                format!(
                    "Level must be between {} and {}, got {}",
                    Self::MIN,
                    Self::MAX,
                    value
                ),
            ));
        }
        Ok(Self(value as u8))
    }
}

impl FromStr for SkillLevel {
    type Err = RecsError;

    fn from_str(s: &str) -> Result<Self> {
        let value: i64 = s.trim().parse().map_err(|_| {
            RecsError::validation("level", format!("Level must be a whole number, got '{}'", s))
        })?;
        Self::try_from(value)
    }
}

impl<'de> Deserialize<'de> for SkillLevel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl From<SkillLevel> for u8 {
    fn from(level: SkillLevel) -> Self {
        level.0
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trim, collapse inner whitespace and lowercase a skill name.
pub fn normalize_skill_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillEntry {
    pub name: String,
    pub level: SkillLevel,
}

impl<'de> Deserialize<'de> for SkillEntry {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            name: String,
            #[serde(default)]
            level: SkillLevel,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(&raw.name, raw.level)
            .ok_or_else(|| serde::de::Error::custom("skill name cannot be empty"))
    }
}

impl SkillEntry {
    /// Returns `None` when the name normalizes to nothing.
    pub fn new(name: &str, level: SkillLevel) -> Option<Self> {
        let name = normalize_skill_name(name);
        if name.is_empty() {
            return None;
        }
        Some(Self { name, level })
    }

    /// The name repeated `level` times, space separated.
    pub fn weighted_segment(&self) -> String {
        vec![self.name.as_str(); usize::from(self.level.get())].join(" ")
    }
}

/// Parses `name` or `name:level`; the level is taken after the last colon.
impl FromStr for SkillEntry {
    type Err = RecsError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, level) = match s.rsplit_once(':') {
            Some((name, level)) => (name, level.parse::<SkillLevel>()?),
            None => (s, SkillLevel::default()),
        };
        Self::new(name, level)
            .ok_or_else(|| RecsError::validation("skill", "Skill name cannot be empty"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Approach {
    #[default]
    #[serde(rename = "hybrid")]
    Hybrid,
    #[serde(rename = "content-based")]
    ContentBased,
    #[serde(rename = "collaborative")]
    Collaborative,
}

impl Approach {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::ContentBased => "content-based",
            Self::Collaborative => "collaborative",
        }
    }
}

impl FromStr for Approach {
    type Err = RecsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "hybrid" => Ok(Self::Hybrid),
            "content-based" | "content" | "content_based" | "contentbased" => Ok(Self::ContentBased),
            "collaborative" | "cf" | "collab" | "collaborative-filtering"
            | "collaborative_filtering" => Ok(Self::Collaborative),
            other => Err(RecsError::validation(
                "approach",
                format!(
                    "Unknown approach '{}'. Valid approaches: hybrid, content-based, collaborative",
                    other
                ),
            )),
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Grades {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub math: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub science: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<f64>,
}

/// JSON body of `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub interests: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub math_grade: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub science_grade: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_grade: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// A complete recommendation call: the profile body plus the query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub profile: UserProfile,
    pub k: usize,
    pub approach: Approach,
}

pub const DEFAULT_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub program_id: String,
    pub program_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: String,
    pub score: f64,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub course_url: Option<String>,
    #[serde(default)]
    pub course_rating: Option<f64>,
}

impl RecommendationItem {
    pub fn skill_tags(&self) -> Vec<&str> {
        self.skills
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    #[serde(default)]
    pub user_id: Option<String>,
    pub recommendations: Vec<RecommendationItem>,
    pub approach: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Clicked,
    Accepted,
    Rejected,
}

impl FromStr for FeedbackType {
    type Err = RecsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "clicked" => Ok(Self::Clicked),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(RecsError::validation(
                "feedback_type",
                format!("Unknown feedback type '{}'. Use clicked, accepted or rejected", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub program_id: String,
    pub feedback_type: FeedbackType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAck {
    pub message: String,
    #[serde(default)]
    pub feedback_type: Option<FeedbackType>,
    #[serde(default)]
    pub program_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub models_loaded: bool,
    #[serde(default)]
    pub tfidf_available: bool,
    #[serde(default)]
    pub cf_model_available: bool,
    #[serde(default)]
    pub programs_loaded: bool,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub program_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramCatalog {
    pub programs: Vec<Program>,
    pub count: usize,
}
