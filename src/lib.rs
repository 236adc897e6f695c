//! adkit: browser-embedded banner delivery and rendering SDK.
//!
//! Compiled to WebAssembly and loaded by publisher pages. The SDK
//! fetches creatives from a delivery service, sanitizes them, renders
//! them into host containers (directly or in a sandboxed iframe), and
//! degrades to a placeholder when anything fails.
//!
//! The exported surface is intentionally small: `initSdk`, `renderSlot`,
//! `setNonce`, `clearCache`, and `resetSdk`. Everything else is internal.

mod config;
mod context;
mod core;
mod telemetry;
mod utils;

pub use crate::config::SdkConfig;
pub use crate::context::SdkContext;
pub use crate::core::{
    BannerCache, CachedBanner, DeliveryError, DeliveryRequest, DeliveryResponse, RenderMethod,
    RenderOptions, RenderResult, SdkError, ValidationError, ValidationErrorCode, fetch_banner,
    fetch_banner_cached, render_banner, sanitize_html, validate_slot_id,
};
pub use crate::telemetry::{Diagnostics, LogLevel};

use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Render result shape returned across the JS boundary.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsRenderResult {
    success: bool,
    method: &'static str,
    error: Option<String>,
}

impl From<RenderResult> for JsRenderResult {
    fn from(result: RenderResult) -> Self {
        Self {
            success: result.success,
            method: result.method.as_str(),
            error: result.error.map(|e| e.to_string()),
        }
    }
}

/// Initialize the SDK with a configuration object, replacing any
/// previous instance. Missing fields take their defaults; an invalid
/// configuration rejects and leaves the previous instance in place.
#[wasm_bindgen(js_name = initSdk)]
pub fn init_sdk(config: JsValue) -> Result<(), JsValue> {
    let config: SdkConfig = if config.is_undefined() || config.is_null() {
        SdkConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
    };

    context::init(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(())
}

/// Render a banner for `slot_id` into `container`.
///
/// Resolves to `{ success, method, error }` and never rejects for
/// delivery or rendering failures; those surface through the result
/// (or the fallback placeholder). Only malformed options reject.
#[wasm_bindgen(js_name = renderSlot)]
pub async fn render_slot(
    slot_id: String,
    container: HtmlElement,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let options: RenderOptions = if options.is_undefined() || options.is_null() {
        RenderOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))?
    };

    let ctx = context::current();
    let result = render_banner(&ctx, &slot_id, &container, &options).await;

    serde_wasm_bindgen::to_value(&JsRenderResult::from(result))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Set the CSP nonce applied to injected style and script tags.
#[wasm_bindgen(js_name = setNonce)]
pub fn set_nonce(nonce: String) -> Result<(), JsValue> {
    context::current()
        .set_nonce(&nonce)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Drop every cached banner.
#[wasm_bindgen(js_name = clearCache)]
pub fn clear_cache() {
    context::current().clear_cache();
}

/// Drop the SDK instance. The next call recreates one from defaults.
#[wasm_bindgen(js_name = resetSdk)]
pub fn reset_sdk() {
    context::reset();
}
