//! Regex-based HTML sanitization pipeline.
//!
//! This is a deliberate, documented limitation: the pipeline is not a
//! parser-backed allow-list sanitizer and has known bypass classes for
//! heavily obfuscated or encoded payloads. A markup-tree sanitizer can
//! be substituted behind the same [`sanitize_html`] contract without
//! changing any caller.

use std::sync::LazyLock;

use regex::Regex;

use super::style::sanitize_style_attribute;
use crate::core::validation::validate_csp_nonce;

/// Event-handler attributes to remove. Closed, explicit set.
pub const EVENT_HANDLERS: &[&str] = &[
    "onabort",
    "onactivate",
    "onafterprint",
    "onafterupdate",
    "onbeforeactivate",
    "onbeforecopy",
    "onbeforecut",
    "onbeforedeactivate",
    "onbeforeeditfocus",
    "onbeforepaste",
    "onbeforeprint",
    "onbeforeunload",
    "onbeforeupdate",
    "onblur",
    "onbounce",
    "oncellchange",
    "onchange",
    "onclick",
    "oncontextmenu",
    "oncontrolselect",
    "oncopy",
    "oncut",
    "ondataavailable",
    "ondatasetchanged",
    "ondatasetcomplete",
    "ondblclick",
    "ondeactivate",
    "ondrag",
    "ondragend",
    "ondragenter",
    "ondragleave",
    "ondragover",
    "ondragstart",
    "ondrop",
    "onerror",
    "onerrorupdate",
    "onfilterchange",
    "onfinish",
    "onfocus",
    "onfocusin",
    "onfocusout",
    "onhelp",
    "onkeydown",
    "onkeypress",
    "onkeyup",
    "onlayoutcomplete",
    "onload",
    "onlosecapture",
    "onmousedown",
    "onmouseenter",
    "onmouseleave",
    "onmousemove",
    "onmouseout",
    "onmouseover",
    "onmouseup",
    "onmousewheel",
    "onmove",
    "onmoveend",
    "onmovestart",
    "onpaste",
    "onpropertychange",
    "onreadystatechange",
    "onreset",
    "onresize",
    "onresizeend",
    "onresizestart",
    "onrowenter",
    "onrowexit",
    "onrowsdelete",
    "onrowsinserted",
    "onscroll",
    "onselect",
    "onselectionchange",
    "onselectstart",
    "onstart",
    "onstop",
    "onsubmit",
    "onunload",
];

/// Number of times the paired script-block pass runs, to defeat simple
/// nested/double-encoded obfuscation attempts.
const SCRIPT_STRIP_PASSES: usize = 3;

fn handler_alternation() -> String {
    EVENT_HANDLERS.join("|")
}

fn protocol_alternation() -> &'static str {
    "javascript:|data:|vbscript:|file:|chrome-extension:|moz-extension:"
}

// =============================================================================
// Compiled Patterns
// =============================================================================

static SCRIPT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("script block"));

// Orphaned open/close fragments left behind by the paired pass.
static SCRIPT_FRAGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?script\b[^>]*>?").expect("script fragment"));

static HANDLER_DQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)\s(?:{})\s*=\s*"[^"]*""#,
        handler_alternation()
    ))
    .expect("handler dq")
});

static HANDLER_SQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\s(?:{})\s*=\s*'[^']*'",
        handler_alternation()
    ))
    .expect("handler sq")
});

static HANDLER_UQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\s(?:{})\s*=\s*[^\s>]*",
        handler_alternation()
    ))
    .expect("handler uq")
});

static HREF_DQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)href\s*=\s*"(?:{})[^"]*""#,
        protocol_alternation()
    ))
    .expect("href dq")
});

static HREF_SQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)href\s*=\s*'(?:{})[^']*'",
        protocol_alternation()
    ))
    .expect("href sq")
});

static HREF_UQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)href\s*=\s*["']?(?:{})[^\s>]*"#,
        protocol_alternation()
    ))
    .expect("href uq")
});

static SRC_DQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)src\s*=\s*"(?:{})[^"]*""#,
        protocol_alternation()
    ))
    .expect("src dq")
});

static SRC_SQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)src\s*=\s*'(?:{})[^']*'",
        protocol_alternation()
    ))
    .expect("src sq")
});

static SRC_UQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)src\s*=\s*["']?(?:{})[^\s>]*"#,
        protocol_alternation()
    ))
    .expect("src uq")
});

static STYLE_DQ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)style\s*=\s*"([^"]*)""#).expect("style dq"));

static STYLE_SQ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)style\s*=\s*'([^']*)'").expect("style sq"));

static NONCE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(style|script)\b([^>]*)>").expect("nonce tag"));

static NONCE_PRESENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnonce\s*=").expect("nonce present"));

// Detection patterns for is_safe_html.
static SCRIPT_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script\b").expect("script open"));

static HANDLER_PRESENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\s(?:{})\s*=", handler_alternation())).expect("handler present")
});

static DANGEROUS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)(?:href|src|action)\s*=\s*["']?(?:{})"#,
        protocol_alternation()
    ))
    .expect("dangerous attr")
});

// =============================================================================
// Pipeline Passes
// =============================================================================

/// Remove `<script>...</script>` blocks and orphaned script fragments.
pub fn sanitize_script_tags(html: &str) -> String {
    let mut sanitized = html.to_string();

    for _ in 0..SCRIPT_STRIP_PASSES {
        sanitized = SCRIPT_BLOCK_RE.replace_all(&sanitized, "").into_owned();
    }

    // Deleting a fragment can splice the surrounding text into a fresh
    // `<script` token, so repeat until none remains.
    while SCRIPT_FRAGMENT_RE.is_match(&sanitized) {
        sanitized = SCRIPT_FRAGMENT_RE.replace_all(&sanitized, "").into_owned();
    }

    sanitized
}

/// Remove all `on*` event-handler attributes regardless of quoting style.
pub fn sanitize_event_handlers(html: &str) -> String {
    let mut sanitized = html.to_string();

    // Quoted forms first so the unquoted pattern never bites into a
    // quoted value containing whitespace.
    for pattern in [&*HANDLER_DQ_RE, &*HANDLER_SQ_RE, &*HANDLER_UQ_RE] {
        while pattern.is_match(&sanitized) {
            sanitized = pattern.replace_all(&sanitized, "").into_owned();
        }
    }

    sanitized
}

/// Neutralize dangerous `href`/`src` values and sanitize inline styles.
pub fn sanitize_attributes(html: &str) -> String {
    let mut sanitized = html.to_string();

    for pattern in [&*HREF_DQ_RE, &*HREF_SQ_RE, &*HREF_UQ_RE] {
        sanitized = pattern.replace_all(&sanitized, r##"href="#""##).into_owned();
    }

    for pattern in [&*SRC_DQ_RE, &*SRC_SQ_RE, &*SRC_UQ_RE] {
        sanitized = pattern.replace_all(&sanitized, r#"src="""#).into_owned();
    }

    let sanitized = STYLE_DQ_RE.replace_all(&sanitized, |caps: &regex::Captures<'_>| {
        let cleaned = sanitize_style_attribute(&caps[1]);
        if cleaned.is_empty() {
            String::new()
        } else {
            format!(r#"style="{}""#, cleaned)
        }
    });

    let sanitized = STYLE_SQ_RE.replace_all(&sanitized, |caps: &regex::Captures<'_>| {
        let cleaned = sanitize_style_attribute(&caps[1]);
        if cleaned.is_empty() {
            String::new()
        } else {
            format!("style='{}'", cleaned)
        }
    });

    sanitized.into_owned()
}

/// Inject a CSP nonce into `<style>`/`<script>` open tags that do not
/// already carry one. The already-carry check keeps the pipeline
/// idempotent.
fn inject_nonce(html: &str, nonce: &str) -> String {
    NONCE_TAG_RE
        .replace_all(html, |caps: &regex::Captures<'_>| {
            if NONCE_PRESENT_RE.is_match(&caps[2]) {
                caps[0].to_string()
            } else {
                format!(r#"<{} nonce="{}"{}>"#, &caps[1], nonce, &caps[2])
            }
        })
        .into_owned()
}

// =============================================================================
// Entry Points
// =============================================================================

/// Comprehensive HTML sanitization.
///
/// Fixed pipeline order, each pass operating on the previous pass's
/// output:
/// 1. strip script blocks (and orphaned fragments)
/// 2. strip event-handler attributes
/// 3. neutralize dangerous `href`/`src`/`style` attribute values
/// 4. inject the CSP nonce into remaining `<style>`/`<script>` tags
///
/// Sanitizing already-sanitized content is a no-op. Never fails; empty
/// input returns an empty string.
pub fn sanitize_html(html: &str, nonce: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let sanitized = sanitize_script_tags(html);
    let sanitized = sanitize_event_handlers(&sanitized);
    let mut sanitized = sanitize_attributes(&sanitized);

    if !nonce.is_empty() && validate_csp_nonce(nonce).is_ok() {
        sanitized = inject_nonce(&sanitized, nonce);
    }

    sanitized
}

/// Check whether markup is already free of the constructs the pipeline
/// removes: script tags, event-handler attributes, and dangerous
/// protocols in `href`/`src`/`action`.
pub fn is_safe_html(html: &str) -> bool {
    !SCRIPT_OPEN_RE.is_match(html)
        && !HANDLER_PRESENT_RE.is_match(html)
        && !DANGEROUS_ATTR_RE.is_match(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_blocks() {
        let out = sanitize_html(r#"<div>ok</div><script>alert(1)</script>"#, "");
        assert_eq!(out, "<div>ok</div>");
    }

    #[test]
    fn strips_nested_and_orphaned_script_fragments() {
        for input in [
            "<scr<script>ipt>alert(1)</script>",
            "<script><script>alert(1)</script></script>",
            "<script src=\"https://evil.example/x.js\">",
            "</script><script>alert(1)",
        ] {
            let out = sanitize_html(input, "");
            assert!(!out.to_lowercase().contains("<script"), "input: {input}");
        }
    }

    #[test]
    fn strips_event_handlers_in_all_quoting_styles() {
        let dq = sanitize_html(r#"<img src="/a.png" onerror="alert(1)">"#, "");
        let sq = sanitize_html("<img src='/a.png' onerror='alert(1)'>", "");
        let uq = sanitize_html("<img src=/a.png onerror=alert(1)>", "");

        for out in [dq, sq, uq] {
            assert!(!out.to_lowercase().contains("onerror"));
            assert!(out.contains("/a.png"));
        }
    }

    #[test]
    fn neutralizes_dangerous_href_and_src() {
        let out = sanitize_html(r#"<a href="javascript:alert(1)">x</a>"#, "");
        assert!(out.contains(r##"href="#""##));

        let out = sanitize_html(r#"<img src="data:text/html,x">"#, "");
        assert!(out.contains(r#"src="""#));
        assert!(!out.contains("data:"));

        let out = sanitize_html("<a href=vbscript:msgbox>x</a>", "");
        assert!(out.contains(r##"href="#""##));
    }

    #[test]
    fn keeps_safe_urls() {
        let input = r#"<a href="https://example.com/offer"><img src="https://cdn.example.com/a.png"></a>"#;
        assert_eq!(sanitize_html(input, ""), input);
    }

    #[test]
    fn sanitizes_style_attributes() {
        let out = sanitize_html(
            r#"<div style="background: url(data:text/html,x)">x</div>"#,
            "",
        );
        assert!(out.contains("url(about:blank)"));

        // A style reduced to nothing is dropped entirely.
        let out = sanitize_html(r#"<div style="javascript:">x</div>"#, "");
        assert!(!out.contains("style="));
    }

    #[test]
    fn injects_nonce_once() {
        let out = sanitize_html("<style>p { color: red }</style>", "abc123");
        assert_eq!(out, r#"<style nonce="abc123">p { color: red }</style>"#);

        // Re-sanitizing must not add a second nonce.
        let again = sanitize_html(&out, "abc123");
        assert_eq!(again, out);
    }

    #[test]
    fn ignores_malformed_nonce() {
        let out = sanitize_html("<style>p{}</style>", "bad\"nonce");
        assert_eq!(out, "<style>p{}</style>");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(sanitize_html("", "abc"), "");
    }

    #[test]
    fn idempotent_on_hostile_samples() {
        let samples = [
            r#"<div onclick="evil()"><script>alert(1)</script></div>"#,
            r#"<a href="javascript:alert(1)" style="width:expression(x)">x</a>"#,
            "<scr<script>ipt>alert(1)</script> onclick=evil",
            r#"<img src='data:text/html,x' onerror='x'><style>p{}</style>"#,
            "plain text with no markup",
        ];

        for sample in samples {
            let once = sanitize_html(sample, "n0nce");
            let twice = sanitize_html(&once, "n0nce");
            assert_eq!(twice, once, "sample: {sample}");
        }
    }

    #[test]
    fn sanitized_output_is_safe() {
        let samples = [
            r#"<script>alert(1)</script>"#,
            r#"<img onerror="x" src="javascript:y">"#,
            r#"<a href='data:text/html,x' onclick='y'>z</a>"#,
        ];

        for sample in samples {
            assert!(!is_safe_html(sample), "sample should be unsafe: {sample}");
            let out = sanitize_html(sample, "");
            assert!(is_safe_html(&out), "output should be safe: {out}");
        }
    }
}
