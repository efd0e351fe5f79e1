use crate::utils::error::{PortfolioError, Result};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> PortfolioError {
    PortfolioError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// API base URLs must be absolute http(s) URLs without a query or fragment,
/// since route paths are appended to them verbatim.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    let url = Url::parse(url_str).map_err(|e| invalid(field_name, url_str, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field_name, url_str, "expected an http or https URL"));
    }
    if url.host_str().is_none() {
        return Err(invalid(field_name, url_str, "missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(field_name, url_str, "query strings and fragments are not allowed"));
    }
    Ok(())
}

/// Output files go into an existing directory and never replace a directory.
pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "path cannot be empty"));
    }

    let target = Path::new(path);
    if target.is_dir() {
        return Err(invalid(field_name, path, "path is a directory"));
    }
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => Err(invalid(
            field_name,
            path,
            format!("directory {} does not exist", parent.display()),
        )),
        _ => Ok(()),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| PortfolioError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "value cannot be blank"));
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
            &value.to_string(),
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api.base_url", "https://example.com").is_ok());
        assert!(validate_url("api.base_url", "http://localhost:8000").is_ok());
        assert!(validate_url("api.base_url", "").is_err());
        assert!(validate_url("api.base_url", "invalid-url").is_err());
        assert!(validate_url("api.base_url", "ftp://example.com").is_err());
        assert!(validate_url("api.base_url", "https://example.com/api?x=1").is_err());
        assert!(validate_url("api.base_url", "https://example.com/#top").is_err());
    }

    #[test]
    fn test_validate_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let inside = dir.path().join("chart.csv");
        let missing_parent = dir.path().join("nope").join("chart.csv");

        assert!(validate_path("--csv", inside.to_str().unwrap()).is_ok());
        assert!(validate_path("--csv", "chart.csv").is_ok());
        assert!(validate_path("--csv", "").is_err());
        assert!(validate_path("--csv", dir.path().to_str().unwrap()).is_err());

        let err = validate_path("--csv", missing_parent.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("display.decimals", 2u32, 0, 8).is_ok());
        assert!(validate_range("display.decimals", 9u32, 0, 8).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let missing: Option<String> = None;
        let err = validate_required_field("auth.username", &missing).unwrap_err();
        assert!(matches!(err, PortfolioError::MissingConfigError { .. }));
        assert_eq!(
            validate_required_field("auth.username", &Some("user".to_string())).unwrap(),
            "user"
        );
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("auth.token", "abc").is_ok());
        assert!(validate_non_empty_string("auth.token", "   ").is_err());
    }
}
