//! Sanitization engine gating all content that crosses the trust boundary.
//!
//! Untrusted creative markup is transformed into markup safe to inject:
//! script vectors, inline event handlers, and dangerous protocols are
//! removed or neutralized. The pipeline is multi-pass and idempotent.
//!
//! This module provides:
//! - [`sanitize_html`] - the full markup pipeline
//! - [`is_safe_html`] - detector for the constructs the pipeline removes
//! - [`is_safe_url`], [`sanitize_href_attribute`], [`sanitize_src_attribute`] -
//!   URL-only primitives used standalone by the renderer's tracking path
//! - [`sanitize_style_attribute`] - inline style sanitization

mod html;
mod style;
mod url;

pub use html::{
    EVENT_HANDLERS, is_safe_html, sanitize_attributes, sanitize_event_handlers, sanitize_html,
    sanitize_script_tags,
};
pub use style::sanitize_style_attribute;
pub use url::{DANGEROUS_PROTOCOLS, is_safe_url, sanitize_href_attribute, sanitize_src_attribute};
