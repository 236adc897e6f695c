//! DOM and Web API utility functions.
//!
//! Provides safe, consistent access to browser APIs with proper error handling.

use web_sys::{Document, HtmlElement, Window};

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Get the current document.
#[inline]
pub fn document() -> Option<Document> {
    window()?.document()
}

/// Check whether an element is attached to the document tree.
///
/// Injecting into a detached container would leave the banner invisible,
/// so the renderer treats a detached container as a render failure.
pub fn is_attached(element: &HtmlElement) -> bool {
    document().is_some_and(|doc| doc.contains(Some(element.as_ref())))
}

/// Get the full URL of the current page, if available.
pub fn page_href() -> Option<String> {
    window()?.location().href().ok()
}

/// Get the origin of the current page, if available.
///
/// Used to validate the origin of messages posted by banner frames.
pub fn page_origin() -> Option<String> {
    window()?.location().origin().ok()
}
