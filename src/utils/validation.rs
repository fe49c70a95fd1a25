use crate::utils::error::{RecsError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RecsError::validation(field_name, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RecsError::validation(
                field_name,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(RecsError::validation(
            field_name,
            format!("Invalid URL format '{}': {}", url_str, e),
        )),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(RecsError::validation(
            field_name,
            format!("Value must be at least {}, got {}", min_value, value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RecsError::validation(
            field_name,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN fails both comparisons, so test containment rather than exclusion
    if !(value >= min && value <= max) {
        return Err(RecsError::validation(
            field_name,
            format!("Value must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api_endpoint", "https://example.com").is_ok());
        assert!(validate_url("api_endpoint", "http://localhost:8000").is_ok());
        assert!(validate_url("api_endpoint", "").is_err());
        assert!(validate_url("api_endpoint", "invalid-url").is_err());
        assert!(validate_url("api_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("k", 5, 1).is_ok());
        assert!(validate_positive_number("k", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("math_grade", 88.0, 0.0, 100.0).is_ok());
        assert!(validate_range("math_grade", 100.5, 0.0, 100.0).is_err());
        assert!(validate_range("math_grade", f64::NAN, 0.0, 100.0).is_err());
        assert!(validate_range("level", 0_i64, 1, 5).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("user_id", "u-1").is_ok());
        assert!(validate_non_empty_string("user_id", "   ").is_err());
    }
}
