//! Network fetching utilities with timeout support.
//!
//! Provides promise racing so each delivery attempt is bounded by the
//! configured per-attempt timeout, plus a fire-and-forget GET used by
//! impression beaconing when `sendBeacon` is unavailable.

use js_sys::{Array, Promise};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode};

use crate::utils::dom;

// =============================================================================
// Promise Racing
// =============================================================================

/// Result of a promise race with timeout.
#[derive(Debug)]
pub enum RaceResult {
    /// The promise completed before timeout.
    Completed(JsValue),
    /// Timeout occurred before promise completed.
    TimedOut,
    /// Promise rejected with an error.
    Error(String),
}

/// Race a promise against a timeout.
///
/// Implements timeout behavior on any JavaScript Promise using
/// `Promise.race` against a `setTimeout` promise that resolves to
/// `undefined`.
pub async fn race_with_timeout(promise: Promise, timeout_ms: i32) -> RaceResult {
    let Some(window) = dom::window() else {
        return RaceResult::Error("Window not available".to_string());
    };

    let timeout_promise = Promise::new(&mut |resolve, _| {
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timeout_ms);
    });

    let race_array = Array::new();
    race_array.push(&promise);
    race_array.push(&timeout_promise);
    let race_promise = Promise::race(&race_array);

    match JsFuture::from(race_promise).await {
        Ok(result) => {
            if result.is_undefined() {
                RaceResult::TimedOut
            } else {
                RaceResult::Completed(result)
            }
        }
        Err(e) => RaceResult::Error(e.as_string().unwrap_or_else(|| "Unknown error".to_string())),
    }
}

// =============================================================================
// Fire-and-forget
// =============================================================================

/// Issue a no-cors GET without awaiting the response.
///
/// The returned promise is dropped deliberately: the caller must never
/// block on, or fail because of, this request.
pub fn fire_and_forget_get(url: &str) {
    let Some(window) = dom::window() else {
        return;
    };

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::NoCors);

    if let Ok(request) = Request::new_with_str_and_init(url, &opts) {
        let _ = window.fetch_with_request(&request);
    }
}
