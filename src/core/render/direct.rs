//! Direct DOM injection with delegated click tracking.
//!
//! The sanitized creative is placed inside a wrapper `div` in the host
//! document. A single delegated click listener on the wrapper routes
//! clicks on links and images through the tracked click URL.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, HtmlElement, MouseEvent, Url};

use crate::context::SdkContext;
use crate::core::cache::CachedBanner;
use crate::core::error::RenderError;
use crate::core::sanitize::{sanitize_href_attribute, sanitize_html};
use crate::utils::dom;

/// Inject a banner directly into the container.
pub fn inject_direct(
    ctx: &SdkContext,
    container: &HtmlElement,
    banner: &CachedBanner,
) -> Result<(), RenderError> {
    let document = dom::document().ok_or(RenderError::NoDocument)?;

    let wrapper: HtmlElement = document
        .create_element("div")
        .map_err(|_| RenderError::ElementCreationFailed("div".to_string()))?
        .dyn_into()
        .map_err(|_| RenderError::ElementCreationFailed("div".to_string()))?;

    wrapper.set_class_name("adkit-banner");
    let style = wrapper.style();
    let _ = style.set_property("width", &format!("{}px", banner.width));
    let _ = style.set_property("height", &format!("{}px", banner.height));
    let _ = style.set_property("display", "inline-block");
    let _ = style.set_property("position", "relative");

    wrapper.set_inner_html(&sanitize_html(&banner.html, &ctx.nonce()));

    attach_click_tracking(&wrapper, &banner.click_url);

    container.set_inner_html("");
    container
        .append_child(&wrapper)
        .map_err(|e| RenderError::InjectionFailed(format!("{e:?}")))?;

    Ok(())
}

/// Delegate clicks on links and images inside the wrapper to the
/// tracked click URL. Unsafe click URLs disable tracking entirely.
fn attach_click_tracking(wrapper: &HtmlElement, click_url: &str) {
    let click_url = sanitize_href_attribute(click_url);
    if click_url.is_empty() || click_url == "#" {
        return;
    }

    let closure = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };

        let hit = target.closest("a").ok().flatten().is_some()
            || target.closest("img").ok().flatten().is_some();
        if hit {
            event.prevent_default();
            open_click_target(&click_url);
        }
    });

    let _ = wrapper.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    // The listener lives as long as the wrapper; leak it.
    closure.forget();
}

/// Open the click target in a new tab with the embedding page attached
/// as the `referrer` query parameter.
pub(crate) fn open_click_target(click_url: &str) {
    let url = match Url::new(click_url) {
        Ok(url) => url,
        Err(_) => {
            // Relative click URLs resolve against the embedding page.
            let Some(base) = dom::page_href() else { return };
            let Ok(url) = Url::new_with_base(click_url, &base) else {
                return;
            };
            url
        }
    };

    if let Some(href) = dom::page_href() {
        url.search_params().set("referrer", &href);
    }

    if let Some(window) = dom::window() {
        let _ = window.open_with_url_and_target(&url.href(), "_blank");
    }
}
