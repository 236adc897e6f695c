//! Inline `style` attribute sanitization.

use std::sync::LazyLock;

use regex::Regex;

use super::url::is_safe_url;

// CSS constructs that execute script in legacy or non-standard engines.
static DANGEROUS_CSS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)expression\s*\(").expect("css pattern"),
        Regex::new(r"(?i)javascript\s*:").expect("css pattern"),
        Regex::new(r"(?i)behavior\s*:").expect("css pattern"),
    ]
});

static CSS_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)url\s*\(\s*['"]?([^)'"]+)['"]?\s*\)"#).expect("css url"));

/// Sanitize an inline style value.
///
/// Strips every occurrence of `expression(`, `javascript:`, and
/// `behavior:` until none remain (a single pass could splice two
/// fragments into a fresh occurrence), then rewrites `url(...)`
/// references with a dangerous protocol to `url(about:blank)`.
pub fn sanitize_style_attribute(style: &str) -> String {
    let mut sanitized = style.to_string();

    for pattern in DANGEROUS_CSS_PATTERNS.iter() {
        while pattern.is_match(&sanitized) {
            sanitized = pattern.replace_all(&sanitized, "").into_owned();
        }
    }

    let sanitized = CSS_URL_RE.replace_all(&sanitized, |caps: &regex::Captures<'_>| {
        if is_safe_url(&caps[1]) {
            caps[0].to_string()
        } else {
            "url(about:blank)".to_string()
        }
    });

    sanitized.trim().to_string()
}
