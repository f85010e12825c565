use crate::utils::error::{AppError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> AppError {
    AppError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 只接受 http / https，且必須有 host
pub fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            value,
            format!("Expected http or https, got '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, value, "URL has no host"));
    }
    Ok(())
}

/// 金鑰必須有值，而且 `${VAR}` 已經被環境變數取代
pub fn validate_secret(field: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(field, "<empty>", "Value cannot be blank"));
    }
    if trimmed.starts_with("${") {
        return Err(AppError::MissingConfigError {
            field: format!("{} ({})", field, trimmed),
        });
    }
    Ok(())
}

pub fn validate_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be blank"));
    }
    Ok(())
}

pub fn validate_coordinates(field: &str, lat: f64, lon: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(invalid(
            field,
            format!("{}, {}", lat, lon),
            "Latitude must be within [-90, 90] and longitude within [-180, 180]",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_one_of(field: &str, values: &[String], allowed: &[&str]) -> Result<()> {
    match values.iter().find(|v| !allowed.contains(&v.as_str())) {
        Some(unknown) => Err(invalid(
            field,
            unknown,
            format!("Unsupported value. Valid values: {}", allowed.join(", ")),
        )),
        None => Ok(()),
    }
}

pub fn validate_directory(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() || path.contains('\0') {
        return Err(invalid(field, path, "Directory path is empty or malformed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("backend.url", "https://abc.supabase.co").is_ok());
        assert!(validate_http_url("backend.url", "http://localhost:54321").is_ok());
        assert!(validate_http_url("backend.url", "").is_err());
        assert!(validate_http_url("backend.url", "abc.supabase.co").is_err());
        assert!(validate_http_url("backend.url", "ftp://abc.supabase.co").is_err());
    }

    #[test]
    fn test_validate_secret() {
        assert!(validate_secret("backend.anon_key", "eyJhbGciOi").is_ok());
        assert!(validate_secret("backend.anon_key", "  ").is_err());
        assert!(matches!(
            validate_secret("backend.anon_key", "${SUPABASE_ANON_KEY}"),
            Err(AppError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates("map", -34.9011, -56.1645).is_ok());
        assert!(validate_coordinates("map", -134.9, -56.1).is_err());
        assert!(validate_coordinates("map", -34.9, 190.0).is_err());
    }

    #[test]
    fn test_validate_one_of() {
        let formats = vec!["json".to_string(), "xlsx".to_string()];
        let err = validate_one_of("refresh.output_formats", &formats, &["json", "csv"]).unwrap_err();
        assert!(err.to_string().contains("xlsx"));
        assert!(validate_one_of("refresh.output_formats", &formats[..1], &["json", "csv"]).is_ok());
    }
}
