//! Sandboxed iframe injection with a postMessage channel.
//!
//! The sanitized creative is wrapped in a self-contained `srcdoc`
//! document that reports clicks and content resizes to the parent via
//! `postMessage`. The parent-side listener accepts only messages whose
//! origin matches the embedding page and whose slot matches the frame
//! it was installed for.

use std::cell::RefCell;
use std::collections::HashMap;

use js_sys::Function;
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{HtmlElement, HtmlIFrameElement, MessageEvent};

use crate::context::SdkContext;
use crate::core::cache::CachedBanner;
use crate::core::error::RenderError;
use crate::core::render::direct::open_click_target;
use crate::core::sanitize::{sanitize_href_attribute, sanitize_html};
use crate::utils::dom;

/// Sandbox grants for banner frames. No top-level navigation.
const FRAME_SANDBOX: &str = "allow-scripts allow-same-origin allow-forms";

/// Message type posted by the frame on creative clicks.
const MSG_CLICK: &str = "adkit-click";

/// Message type posted by the frame when its content resizes.
const MSG_RESIZE: &str = "adkit-resize";

/// Message shape posted by the frame document.
#[derive(Debug, Deserialize)]
struct FrameMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    slot: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
}

/// Inject a banner into the container inside a sandboxed iframe.
pub fn inject_iframe(
    ctx: &SdkContext,
    slot_id: &str,
    container: &HtmlElement,
    banner: &CachedBanner,
) -> Result<(), RenderError> {
    let document = dom::document().ok_or(RenderError::NoDocument)?;

    let iframe: HtmlIFrameElement = document
        .create_element("iframe")
        .map_err(|_| RenderError::ElementCreationFailed("iframe".to_string()))?
        .dyn_into()
        .map_err(|_| RenderError::ElementCreationFailed("iframe".to_string()))?;

    iframe.set_class_name("adkit-banner-frame");
    iframe.set_title("Advertisement");
    iframe.set_width(&banner.width.to_string());
    iframe.set_height(&banner.height.to_string());
    let _ = iframe.set_attribute("sandbox", FRAME_SANDBOX);

    let style = iframe.style();
    let _ = style.set_property("border", "none");
    let _ = style.set_property("overflow", "hidden");
    let _ = style.set_property("display", "block");

    let nonce = ctx.nonce();
    let sanitized = sanitize_html(&banner.html, &nonce);
    let click_url = sanitize_href_attribute(&banner.click_url);
    iframe.set_srcdoc(&build_frame_document(&sanitized, slot_id, &click_url, &nonce));

    attach_message_listener(slot_id, &iframe);

    container.set_inner_html("");
    container
        .append_child(&iframe)
        .map_err(|e| RenderError::InjectionFailed(format!("{e:?}")))?;

    Ok(())
}

/// Build the self-contained frame document around the sanitized
/// creative. Slot and click URL are embedded as JSON string literals;
/// the frame validates nothing itself, the parent listener does.
pub(crate) fn build_frame_document(
    sanitized_html: &str,
    slot_id: &str,
    click_url: &str,
    nonce: &str,
) -> String {
    let slot_json = script_literal(slot_id);
    let click_json = script_literal(click_url);
    let nonce_attr = if nonce.is_empty() {
        String::new()
    } else {
        format!(" nonce=\"{nonce}\"")
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<style{nonce_attr}>body{{margin:0;padding:0}}a{{text-decoration:none}}img{{border:none}}</style>
</head>
<body>
{sanitized_html}
<script{nonce_attr}>
(function() {{
  var slot = {slot_json};
  var clickUrl = {click_json};
  document.body.addEventListener('click', function(e) {{
    var target = e.target && e.target.closest ? e.target.closest('a, img') : null;
    if (target) {{
      e.preventDefault();
      window.parent.postMessage({{ type: '{MSG_CLICK}', slot: slot, url: clickUrl }}, '*');
    }}
  }});
  if (typeof ResizeObserver === 'function') {{
    new ResizeObserver(function() {{
      window.parent.postMessage({{
        type: '{MSG_RESIZE}',
        slot: slot,
        width: document.body.scrollWidth,
        height: document.body.scrollHeight
      }}, '*');
    }}).observe(document.body);
  }}
}})();
</script>
</body>
</html>"#
    )
}

/// Encode a value as a JS string literal safe to embed in an inline
/// `<script>` block. JSON alone is not enough: the HTML parser scans
/// the raw bytes for `</script` before the JS parser ever runs, so a
/// `<` inside the value could close the block and start a new tag.
fn script_literal(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
}

thread_local! {
    // One live parent-side listener per slot. Re-injecting a slot must
    // replace its listener, or every prior render would still react to
    // the new frame's messages.
    static FRAME_LISTENERS: RefCell<HashMap<String, Function>> =
        RefCell::new(HashMap::new());
}

/// Listen for frame messages on the parent window, replacing any
/// listener a previous render installed for the same slot.
///
/// Messages are dropped unless their origin matches the embedding page
/// and their slot matches this frame. Click URLs are re-sanitized on
/// receipt; the frame's payload is untrusted.
fn attach_message_listener(slot_id: &str, iframe: &HtmlIFrameElement) {
    let Some(window) = dom::window() else { return };
    let Some(expected_origin) = dom::page_origin() else {
        return;
    };

    let slot_key = slot_id.to_string();
    let slot_id = slot_id.to_string();
    let iframe = iframe.clone();

    let closure = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        if event.origin() != expected_origin {
            return;
        }

        let Ok(message) = serde_wasm_bindgen::from_value::<FrameMessage>(event.data()) else {
            return;
        };

        if message.slot != slot_id {
            return;
        }

        match message.kind.as_str() {
            MSG_CLICK => {
                let url = sanitize_href_attribute(&message.url);
                if !url.is_empty() && url != "#" {
                    open_click_target(&url);
                }
            }
            MSG_RESIZE => {
                if let Some(width) = message.width.filter(|w| *w > 0.0) {
                    iframe.set_width(&(width.round() as u32).to_string());
                }
                if let Some(height) = message.height.filter(|h| *h > 0.0) {
                    iframe.set_height(&(height.round() as u32).to_string());
                }
            }
            _ => {}
        }
    });

    let listener: Function = closure.as_ref().unchecked_ref::<Function>().clone();

    FRAME_LISTENERS.with(|listeners| {
        let mut listeners = listeners.borrow_mut();
        if let Some(previous) = listeners.remove(&slot_key) {
            let _ = window.remove_event_listener_with_callback("message", &previous);
        }
        listeners.insert(slot_key, listener.clone());
    });

    let _ = window.add_event_listener_with_callback("message", &listener);
    closure.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_document_embeds_creative_and_channel() {
        let doc = build_frame_document(
            "<div>hello</div>",
            "ad-123",
            "https://ads.example.com/click",
            "",
        );

        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<div>hello</div>"));
        assert!(doc.contains(r#"var slot = "ad-123";"#));
        assert!(doc.contains(r#"var clickUrl = "https://ads.example.com/click";"#));
        assert!(doc.contains(MSG_CLICK));
        assert!(doc.contains(MSG_RESIZE));
        assert!(!doc.contains(" nonce="));
    }

    #[test]
    fn frame_document_applies_nonce_to_injected_tags() {
        let doc = build_frame_document("<div>x</div>", "ad-1", "#", "abc-123");
        assert!(doc.contains(r#"<style nonce="abc-123">"#));
        assert!(doc.contains(r#"<script nonce="abc-123">"#));
    }

    #[test]
    fn frame_document_escapes_click_url() {
        let doc = build_frame_document("<div>x</div>", "ad-1", "https://e.com/?a=\"b\"", "");
        assert!(doc.contains(r#"var clickUrl = "https://e.com/?a=\"b\"";"#));
    }

    #[test]
    fn click_url_cannot_close_the_inline_script() {
        // Passes the protocol check untouched, so the document builder
        // alone must keep it inert inside the script block.
        let url = "https://ads.example.com/c?x=</script><script>parent.document.title='x'</script>";
        let sanitized = sanitize_href_attribute(url);
        assert_eq!(sanitized, url);

        let doc = build_frame_document("<div>x</div>", "ad-1", &sanitized, "");
        assert!(!doc.contains("</script><script>"));
        assert!(doc.contains("\\u003c/script"));
        // Only the document's own closing tag survives as raw bytes.
        assert_eq!(doc.matches("</script").count(), 1);
    }

    #[test]
    fn slot_marker_cannot_close_the_inline_script() {
        let doc = build_frame_document("<div>x</div>", "a</script><script>b", "#", "");
        assert_eq!(doc.matches("</script").count(), 1);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::*;

    use crate::context::SdkContext;

    wasm_bindgen_test_configure!(run_in_browser);

    fn banner() -> CachedBanner {
        CachedBanner {
            html: "<div>ad</div>".to_string(),
            width: 300,
            height: 250,
            click_url: "https://ads.example.com/c".to_string(),
            impression_url: String::new(),
            campaign_id: String::new(),
        }
    }

    fn attached_container() -> HtmlElement {
        let document = web_sys::window().unwrap().document().unwrap();
        let element: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
        document.body().unwrap().append_child(&element).unwrap();
        element
    }

    #[wasm_bindgen_test]
    fn reinjection_replaces_the_frame_listener() {
        let ctx = SdkContext::with_defaults();
        let container = attached_container();

        inject_iframe(&ctx, "ad-frame", &container, &banner()).unwrap();
        let first = FRAME_LISTENERS
            .with(|l| l.borrow().get("ad-frame").cloned())
            .unwrap();

        inject_iframe(&ctx, "ad-frame", &container, &banner()).unwrap();
        let second = FRAME_LISTENERS
            .with(|l| l.borrow().get("ad-frame").cloned())
            .unwrap();

        // The old listener was removed and replaced, not stacked.
        let first: &JsValue = first.as_ref();
        let second: &JsValue = second.as_ref();
        assert!(first != second);
        assert_eq!(FRAME_LISTENERS.with(|l| l.borrow().len()), 1);
    }
}
