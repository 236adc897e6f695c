//! URL-only sanitization primitives.
//!
//! These are the narrow checks the HTML pipeline composes, exposed
//! standalone for the renderer's click/impression path, which builds
//! URLs independently of markup sanitization.

/// Dangerous URL protocols. Closed, explicit set: extending it is a
/// deliberate configuration change, not inferred.
pub const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "vbscript:",
    "file:",
    "chrome-extension:",
    "moz-extension:",
];

/// Check whether a URL is safe to use in `href`/`src`/`url(...)`.
///
/// Empty URLs are unsafe; otherwise the URL is unsafe when it starts
/// with a dangerous protocol (case-insensitive, leading whitespace
/// ignored).
pub fn is_safe_url(url: &str) -> bool {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return false;
    }

    let lower = trimmed.to_lowercase();
    !DANGEROUS_PROTOCOLS
        .iter()
        .any(|protocol| lower.starts_with(protocol))
}

/// Sanitize an `href` value: unsafe URLs become the `#` placeholder.
pub fn sanitize_href_attribute(href: &str) -> String {
    let trimmed = href.trim();

    if trimmed.is_empty() {
        return String::new();
    }

    if !is_safe_url(trimmed) {
        return "#".to_string();
    }

    trimmed.to_string()
}

/// Sanitize a `src` value: unsafe URLs become empty.
pub fn sanitize_src_attribute(src: &str) -> String {
    let trimmed = src.trim();

    if trimmed.is_empty() || !is_safe_url(trimmed) {
        return String::new();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_urls() {
        assert!(is_safe_url("https://ads.example.com/click"));
        assert!(is_safe_url("/relative/path"));
        assert!(is_safe_url("about:blank"));
    }

    #[test]
    fn dangerous_urls() {
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url("JAVASCRIPT:alert(1)"));
        assert!(!is_safe_url("  data:text/html,<script>x</script>"));
        assert!(!is_safe_url("vbscript:msgbox"));
        assert!(!is_safe_url("file:///etc/passwd"));
        assert!(!is_safe_url("chrome-extension://abc"));
        assert!(!is_safe_url(""));
    }

    #[test]
    fn href_placeholder() {
        assert_eq!(sanitize_href_attribute("javascript:alert(1)"), "#");
        assert_eq!(
            sanitize_href_attribute(" https://example.com "),
            "https://example.com"
        );
        assert_eq!(sanitize_href_attribute("   "), "");
    }

    #[test]
    fn src_emptied() {
        assert_eq!(sanitize_src_attribute("data:image/png;base64,x"), "");
        assert_eq!(
            sanitize_src_attribute("https://cdn.example.com/banner.png"),
            "https://cdn.example.com/banner.png"
        );
        assert_eq!(sanitize_src_attribute(""), "");
    }
}
