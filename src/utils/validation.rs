use crate::utils::error::{PivnetError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> PivnetError {
    PivnetError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// 產品 slug 只允許小寫英數、`-` 與 `_`，避免組出錯誤的 URL 路徑
pub fn validate_slug(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;
    let ok = value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !ok {
        return Err(invalid(
            field_name,
            value,
            "Only lowercase letters, digits, '-' and '_' are allowed",
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
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api_host", "https://network.pivotal.io").is_ok());
        assert!(validate_url("api_host", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("api_host", "").is_err());
        assert!(validate_url("api_host", "invalid-url").is_err());
        assert!(validate_url("api_host", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("product_slug", "stemcells").is_ok());
        assert!(validate_slug("product_slug", "p-mysql_2").is_ok());
        assert!(validate_slug("product_slug", "Stemcells").is_err());
        assert!(validate_slug("product_slug", "a/b").is_err());
        assert!(validate_slug("product_slug", "  ").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("release_id", 512u64, 1, 999_999).is_ok());
        assert!(validate_range("release_id", 0u64, 1, 999_999).is_err());
        assert!(validate_range("version", 100_000u32, 1, 99_999).is_err());
    }
}
