use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

/// Validate an optional URL-ish field (non-empty, bounded, http(s) scheme).
pub fn validate_optional_url(url: Option<&str>, name: &str) -> Result<(), AppError> {
    if let Some(url) = url {
        let url = url.trim();
        if url.is_empty() || url.len() > 2048 {
            return Err(AppError::Validation(format!(
                "{name} must be 1-2048 characters"
            )));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::Validation(format!(
                "{name} must be an http(s) URL"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Launch Week").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(257)).is_err());
    }

    #[test]
    fn test_validate_optional_url() {
        assert!(validate_optional_url(None, "banner_url").is_ok());
        assert!(validate_optional_url(Some("https://example.com/b.png"), "banner_url").is_ok());
        assert!(validate_optional_url(Some("ftp://example.com"), "banner_url").is_err());
        assert!(validate_optional_url(Some(""), "banner_url").is_err());
    }
}
