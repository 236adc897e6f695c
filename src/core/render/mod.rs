//! Banner rendering: size detection, injection, and impression tracking.
//!
//! [`render_banner`] drives the full pipeline for one slot: validate the
//! identifier, detect the container size, fetch through the cache, inject
//! via the selected strategy, and fire the impression beacon. Failures
//! degrade to the fallback placeholder when enabled; the host page never
//! observes a panic or an exception from this path.

mod direct;
mod iframe;

use serde::Deserialize;
use serde_json::json;
use web_sys::HtmlElement;

use crate::config::{DEFAULT_BANNER_HEIGHT, DEFAULT_BANNER_WIDTH};
use crate::context::SdkContext;
use crate::core::client::{DeliveryRequest, fetch_banner_cached};
use crate::core::error::{RenderError, SdkError};
use crate::core::fallback::render_fallback;
use crate::core::sanitize::is_safe_url;
use crate::core::validation::validate_slot_id;
use crate::utils::dom;
use crate::utils::fire_and_forget_get;

// =============================================================================
// Options & Results
// =============================================================================

/// Per-call rendering options. Unset fields fall back to the SDK
/// configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub referer: Option<String>,
    pub use_iframe: Option<bool>,
    pub fallback_enabled: Option<bool>,
    /// Include the failure in the returned result even when the
    /// fallback placeholder was shown.
    pub expose_errors: bool,
}

/// How a slot ended up on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMethod {
    Direct,
    Iframe,
    Fallback,
}

impl RenderMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Iframe => "iframe",
            Self::Fallback => "fallback",
        }
    }
}

/// Outcome of one render call.
#[derive(Debug)]
pub struct RenderResult {
    pub success: bool,
    pub method: RenderMethod,
    pub error: Option<SdkError>,
}

// =============================================================================
// Pipeline
// =============================================================================

/// Render a banner for `slot_id` into `container`.
pub async fn render_banner(
    ctx: &SdkContext,
    slot_id: &str,
    container: &HtmlElement,
    options: &RenderOptions,
) -> RenderResult {
    if let Err(error) = validate_slot_id(slot_id) {
        return fail(ctx, container, options, error.into());
    }

    if !dom::is_attached(container) {
        return fail(ctx, container, options, RenderError::ContainerDetached.into());
    }

    ctx.diagnostics.record_event(
        "render.phase",
        json!({ "slot": slot_id, "phase": "requested" }),
    );

    let (detected_width, detected_height) = detect_container_size(container);
    let request = DeliveryRequest {
        slot_id: slot_id.to_string(),
        width: Some(options.width.unwrap_or(detected_width)),
        height: Some(options.height.unwrap_or(detected_height)),
        referer: options.referer.clone().or_else(dom::page_href),
    };

    let banner = match fetch_banner_cached(ctx, &request).await {
        Ok(banner) => banner,
        Err(error) => return fail(ctx, container, options, error.into()),
    };

    let use_iframe = options.use_iframe.unwrap_or(ctx.config.iframe_mode);
    let method = if use_iframe {
        RenderMethod::Iframe
    } else {
        RenderMethod::Direct
    };

    ctx.diagnostics.record_event(
        "render.phase",
        json!({ "slot": slot_id, "phase": "sanitizing" }),
    );
    ctx.diagnostics.record_event(
        "render.phase",
        json!({ "slot": slot_id, "phase": "injecting", "method": method.as_str() }),
    );

    let injected = if use_iframe {
        iframe::inject_iframe(ctx, slot_id, container, &banner)
    } else {
        direct::inject_direct(ctx, container, &banner)
    };

    if let Err(error) = injected {
        return fail(ctx, container, options, error.into());
    }

    track_impression(ctx, &banner.impression_url);

    ctx.diagnostics.incr("render.success");
    ctx.diagnostics.record_event(
        "render.phase",
        json!({ "slot": slot_id, "phase": "rendered", "method": method.as_str() }),
    );

    RenderResult {
        success: true,
        method,
        error: None,
    }
}

/// Detect the container's rendered size.
///
/// Tries the layout box first, then CSS computed styles, and finally
/// the default banner size when the container has no measurable size.
pub fn detect_container_size(element: &HtmlElement) -> (u32, u32) {
    let rect = element.get_bounding_client_rect();
    if rect.width() > 0.0 && rect.height() > 0.0 {
        return (rect.width().round() as u32, rect.height().round() as u32);
    }

    if let Some(window) = dom::window() {
        if let Ok(Some(styles)) = window.get_computed_style(element) {
            let width = styles
                .get_property_value("width")
                .ok()
                .and_then(|v| parse_px(&v));
            let height = styles
                .get_property_value("height")
                .ok()
                .and_then(|v| parse_px(&v));

            if let (Some(width), Some(height)) = (width, height) {
                if width > 0 && height > 0 {
                    return (width, height);
                }
            }
        }
    }

    (DEFAULT_BANNER_WIDTH, DEFAULT_BANNER_HEIGHT)
}

fn parse_px(value: &str) -> Option<u32> {
    value
        .trim()
        .trim_end_matches("px")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u32)
}

/// Fire the impression beacon. Never blocks rendering: `sendBeacon`
/// when available, a dropped no-cors GET otherwise.
fn track_impression(ctx: &SdkContext, impression_url: &str) {
    if impression_url.is_empty() || !is_safe_url(impression_url) {
        return;
    }

    let sent = dom::window()
        .map(|window| window.navigator())
        .and_then(|navigator| navigator.send_beacon(impression_url).ok())
        .unwrap_or(false);

    if !sent {
        fire_and_forget_get(impression_url);
    }

    ctx.diagnostics.incr("track.impressions");
}

/// Route a failure: report it, then either show the fallback
/// placeholder or surface the error to the caller.
fn fail(
    ctx: &SdkContext,
    container: &HtmlElement,
    options: &RenderOptions,
    error: SdkError,
) -> RenderResult {
    ctx.diagnostics.error(
        "render failed",
        Some(json!({ "error": error.to_string() })),
    );
    ctx.diagnostics.incr("render.errors");

    let fallback_enabled = options
        .fallback_enabled
        .unwrap_or(ctx.config.fallback_enabled);

    if fallback_enabled {
        let exposed = if options.expose_errors { Some(error) } else { None };
        return render_fallback(ctx, container, exposed);
    }

    RenderResult {
        success: false,
        method: RenderMethod::Fallback,
        error: Some(error),
    }
}
