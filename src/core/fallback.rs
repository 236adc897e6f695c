//! Fallback placeholder shown when delivery or rendering fails.
//!
//! The placeholder is fully self-contained: fixed markup, inline styles,
//! no external references, and no network activity. Showing it counts as
//! a successful render from the host page's point of view.

use web_sys::HtmlElement;

use crate::context::SdkContext;
use crate::core::error::SdkError;
use crate::core::render::{RenderMethod, RenderResult, detect_container_size};

/// Placeholder markup for the given box size.
pub fn fallback_html(width: u32, height: u32) -> String {
    format!(
        r#"<div class="adkit-fallback" style="width:{width}px;height:{height}px;display:flex;align-items:center;justify-content:center;background:#f0f0f0;border:1px dashed #ccc;text-align:center;padding:20px;box-sizing:border-box;font-family:Arial,sans-serif;font-size:14px;color:#666;"><div><p style="margin:0;">Advertisement</p><p style="margin:4px 0 0;font-size:12px;color:#999;">Temporarily unavailable</p></div></div>"#
    )
}

/// Replace the container's content with the placeholder.
///
/// `error` is what triggered the fallback; it is carried in the result
/// only when the caller asked for it.
pub fn render_fallback(
    ctx: &SdkContext,
    container: &HtmlElement,
    error: Option<SdkError>,
) -> RenderResult {
    let (width, height) = detect_container_size(container);
    container.set_inner_html(&fallback_html(width, height));

    ctx.diagnostics.incr("render.fallbacks");
    ctx.diagnostics.record_event(
        "render.phase",
        serde_json::json!({ "phase": "fallback" }),
    );

    RenderResult {
        success: true,
        method: RenderMethod::Fallback,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_self_contained() {
        let html = fallback_html(300, 250);
        assert!(html.contains("Advertisement"));
        assert!(html.contains("Temporarily unavailable"));
        // No external references of any kind.
        assert!(!html.contains("http"));
        assert!(!html.contains("src="));
        assert!(!html.contains("<script"));
    }

    #[test]
    fn placeholder_is_deterministic_and_sized() {
        assert_eq!(fallback_html(300, 250), fallback_html(300, 250));
        assert!(fallback_html(728, 90).contains("width:728px"));
        assert!(fallback_html(728, 90).contains("height:90px"));
    }
}
