use crate::utils::error::{Result, TrackerError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TrackerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TrackerError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

/// 三碼英文字母代碼 (IATA 城市碼、ISO 貨幣碼共用)
pub fn validate_alpha_code(field_name: &str, value: &str) -> Result<()> {
    if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected a three-letter code".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("sheety.prices_endpoint", "https://api.sheety.co/x/prices").is_ok());
        assert!(validate_url("sheety.prices_endpoint", "http://localhost:8080").is_ok());
        assert!(validate_url("sheety.prices_endpoint", "").is_err());
        assert!(validate_url("sheety.prices_endpoint", "invalid-url").is_err());
        assert!(validate_url("sheety.prices_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_alpha_code() {
        assert!(validate_alpha_code("search.origin", "LON").is_ok());
        assert!(validate_alpha_code("search.origin", "lon").is_ok());
        assert!(validate_alpha_code("search.origin", "LONDON").is_err());
        assert!(validate_alpha_code("search.origin", "L0N").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("amadeus.api_key", "abc").is_ok());
        assert!(matches!(
            validate_non_empty_string("amadeus.api_key", "   "),
            Err(TrackerError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("search.adults", 1u32, 1, 9).is_ok());
        assert!(validate_range("search.adults", 0u32, 1, 9).is_err());
        assert!(validate_range("search.max_offers", 251u32, 1, 250).is_err());
    }
}
