//! URL allow-list for `src`/`href` attributes.
//!
//! Absolute URLs must use `http` or `https`; image sources may also be
//! `data:image/*` (except SVG). Relative references are accepted. Anything
//! else is rejected, including schemes the browser would normalize into
//! `javascript:` (mixed case, embedded control characters, leading
//! whitespace).

use url::Url;

const SAFE_SCHEMES: &[&str] = &["http", "https"];

/// Check a URL attribute value, returning the trimmed value to store
pub fn check_url(value: &str, allow_data_images: bool) -> Result<String, String> {
    if value.chars().any(|c| c.is_control()) {
        return Err("URL contains control characters".to_string());
    }

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("URL is empty".to_string());
    }

    match Url::parse(trimmed) {
        Ok(url) => match url.scheme() {
            scheme if SAFE_SCHEMES.contains(&scheme) => Ok(trimmed.to_string()),
            "data" if allow_data_images => {
                check_data_image(trimmed)?;
                Ok(trimmed.to_string())
            }
            scheme => Err(format!("scheme '{}' is not allowed", scheme)),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            if has_scheme_like_prefix(trimmed) {
                Err("URL has a malformed scheme".to_string())
            } else {
                Ok(trimmed.to_string())
            }
        }
        Err(err) => Err(format!("malformed URL: {}", err)),
    }
}

/// `data:` payload must declare a raster image media type
fn check_data_image(value: &str) -> Result<(), String> {
    let header = value
        .get("data:".len()..)
        .unwrap_or_default()
        .split(|c: char| c == ',' || c == ';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let subtype = header.strip_prefix("image/").unwrap_or_default();
    let well_formed = !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'));

    if well_formed && !subtype.starts_with("svg") {
        Ok(())
    } else {
        Err(format!("data URL media type '{}' is not allowed", header))
    }
}

/// A ':' before the first '/', '?' or '#' would make a browser read a scheme
fn has_scheme_like_prefix(value: &str) -> bool {
    let end = value.find(|c: char| matches!(c, '/' | '?' | '#')).unwrap_or(value.len());
    value[..end].contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_web_urls() {
        assert!(check_url("https://cdn.example.org/a.png", false).is_ok());
        assert!(check_url("http://example.org", false).is_ok());
        assert_eq!(
            check_url("  https://example.org/x  ", false).unwrap(),
            "https://example.org/x"
        );
    }

    #[test]
    fn test_accepts_relative_references() {
        assert!(check_url("/media/ecg.png", false).is_ok());
        assert!(check_url("lessons/2#quiz", false).is_ok());
        assert!(check_url("#anchor", false).is_ok());
        assert!(check_url("//cdn.example.org/a.png", false).is_ok());
    }

    #[test]
    fn test_rejects_script_schemes() {
        for value in [
            "javascript:alert(1)",
            "JaVaScRiPt:alert(1)",
            "  javascript:alert(1)",
            "java\tscript:alert(1)",
            "java\nscript:alert(1)",
            "javascript :alert(1)",
            "vbscript:msgbox",
            "file:///etc/passwd",
        ] {
            assert!(check_url(value, true).is_err(), "accepted {:?}", value);
        }
    }

    #[test]
    fn test_data_urls_only_for_raster_images() {
        assert!(check_url("data:image/png;base64,iVBORw0KGgo=", true).is_ok());
        assert!(check_url("data:image/png;base64,iVBORw0KGgo=", false).is_err());
        assert!(check_url("data:text/html,<script>alert(1)</script>", true).is_err());
        assert!(check_url("data:image/svg+xml,<svg onload=alert(1)>", true).is_err());
    }

    #[test]
    fn test_svg_data_url_with_padded_media_type() {
        assert!(check_url("data:image/svg+xml ;base64,PHN2Zz4=", true).is_err());
        assert!(check_url("data: IMAGE/SVG+XML;base64,PHN2Zz4=", true).is_err());
        assert!(check_url("data:image/ svg+xml;base64,PHN2Zz4=", true).is_err());
        assert!(check_url("data:image/jpeg ;base64,/9j/4AAQ", true).is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(check_url("   ", false).is_err());
    }
}
