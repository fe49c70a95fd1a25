use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecsError {
    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Add at least one skill before requesting recommendations")]
    EmptyQueryError,

    #[error("A recommendation request is already pending")]
    SubmissionPendingError,

    #[error("Recommendation request failed: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Failures talking to the recommendation service.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {message}")]
    MalformedResponse { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RecsError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::EmptyQueryError | Self::SubmissionPendingError => {
                ErrorCategory::Input
            }
            Self::RetrievalError(_) => ErrorCategory::Network,
            Self::ConfigError { .. } | Self::TomlError(_) => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SubmissionPendingError => ErrorSeverity::Low,
            Self::RetrievalError(_) => ErrorSeverity::Medium,
            Self::ValidationError { .. }
            | Self::EmptyQueryError
            | Self::ConfigError { .. }
            | Self::TomlError(_) => ErrorSeverity::High,
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    /// Medium-severity errors are worth resubmitting as-is.
    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ValidationError { field, .. } if field == "level" => {
                "Use an experience level between 1 and 5".to_string()
            }
            Self::ValidationError { field, .. } => format!("Check the value given for '{}'", field),
            Self::EmptyQueryError => "Add at least one skill, e.g. --skill python:4".to_string(),
            Self::SubmissionPendingError => {
                "Wait for the current request to finish before submitting again".to_string()
            }
            Self::RetrievalError(RetrievalError::Transport(_)) => {
                "Check that the recommendation service is running and reachable".to_string()
            }
            Self::RetrievalError(RetrievalError::Status { status, .. }) if *status < 500 => {
                "The service rejected the request; check the approach and k parameters".to_string()
            }
            Self::RetrievalError(_) => {
                "The service had a problem; your skills are kept, try submitting again".to_string()
            }
            Self::ConfigError { .. } | Self::TomlError(_) => {
                "Check the configuration file and command line arguments".to_string()
            }
            Self::IoError(_) | Self::CsvError(_) => {
                "Check file paths and permissions".to_string()
            }
            Self::SerializationError(_) => "Report this as a bug".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message, .. } => message.clone(),
            Self::EmptyQueryError => "Please add at least one skill.".to_string(),
            Self::SubmissionPendingError => "Still waiting for recommendations...".to_string(),
            Self::RetrievalError(RetrievalError::Transport(_)) => {
                "Could not reach the recommendation service.".to_string()
            }
            Self::RetrievalError(RetrievalError::Status { status, body }) => {
                format!("The recommendation service returned an error ({}): {}", status, body)
            }
            Self::RetrievalError(RetrievalError::MalformedResponse { .. }) => {
                "The recommendation service sent a response that could not be read.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_and_category() {
        let err = RecsError::validation("level", "Level must be between 1 and 5");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("between 1 and 5"));

        let err = RecsError::from(RetrievalError::Status {
            status: 503,
            body: "down".to_string(),
        });
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());
        assert!(err.user_friendly_message().contains("503"));
    }

    #[test]
    fn test_empty_query_message() {
        let err = RecsError::EmptyQueryError;
        assert_eq!(err.user_friendly_message(), "Please add at least one skill.");
        assert!(!err.is_retryable());
    }
}
