//! Delivery client with per-attempt timeouts and retry backoff.
//!
//! Fetches banner payloads from the delivery service. Each attempt is
//! bounded by the configured timeout; transient failures are retried
//! with exponential backoff and jitter, up to the configured total
//! attempt count (the initial request included). Retry eligibility is
//! decided by [`DeliveryError::is_retryable`].

use std::future::Future;

use serde::Deserialize;
use serde_json::json;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response, Url};

use crate::context::SdkContext;
use crate::core::cache::CachedBanner;
use crate::core::error::DeliveryError;
use crate::utils::dom;
use crate::utils::{RaceResult, race_with_timeout};

/// Cap on a single backoff delay.
const MAX_BACKOFF_MS: u64 = 8_000;

/// Maximum random jitter added to each backoff delay.
const MAX_JITTER_MS: f64 = 500.0;

// =============================================================================
// Request & Wire Types
// =============================================================================

/// Parameters for one banner request.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub slot_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub referer: Option<String>,
}

impl DeliveryRequest {
    /// Build a request for a slot, defaulting the referer to the
    /// embedding page's URL.
    pub fn new(slot_id: impl Into<String>) -> Self {
        Self {
            slot_id: slot_id.into(),
            width: None,
            height: None,
            referer: dom::page_href(),
        }
    }
}

/// Creative payload of a delivery response.
#[derive(Debug, Clone, Deserialize)]
pub struct Creative {
    pub html: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Tracking URLs of a delivery response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tracking {
    #[serde(default)]
    pub impression: String,
    #[serde(default)]
    pub click: String,
}

/// A successful delivery response. `creative` and `tracking` are
/// required; a body missing either is rejected as invalid.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryResponse {
    pub creative: Creative,
    pub tracking: Tracking,
    #[serde(default, alias = "campaignID")]
    pub campaign_id: String,
    #[serde(default, alias = "ttlMs")]
    pub ttl_ms: Option<f64>,
}

impl From<DeliveryResponse> for CachedBanner {
    fn from(response: DeliveryResponse) -> Self {
        Self {
            html: response.creative.html,
            width: response.creative.width,
            height: response.creative.height,
            click_url: response.tracking.click,
            impression_url: response.tracking.impression,
            campaign_id: response.campaign_id,
        }
    }
}

/// Parse and validate a delivery response body.
pub fn parse_delivery_response(body: &str) -> Result<DeliveryResponse, DeliveryError> {
    let response: DeliveryResponse =
        serde_json::from_str(body).map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;

    if response.creative.html.is_empty() {
        return Err(DeliveryError::InvalidResponse(
            "empty creative html".to_string(),
        ));
    }

    Ok(response)
}

// =============================================================================
// URL Construction
// =============================================================================

/// Delivery path for a slot: `{endpoint}/delivery/{slot_id}`.
pub fn delivery_path(endpoint: &str, slot_id: &str) -> String {
    format!("{}/delivery/{}", endpoint.trim_end_matches('/'), slot_id)
}

/// Resolve the full request URL against the embedding page, attaching
/// width/height/referer query parameters when present.
fn build_delivery_url(endpoint: &str, request: &DeliveryRequest) -> Result<String, DeliveryError> {
    let path = delivery_path(endpoint, &request.slot_id);
    let base = dom::page_href().ok_or(DeliveryError::NoWindow)?;
    let url = Url::new_with_base(&path, &base).map_err(|_| DeliveryError::RequestCreationFailed)?;

    let params = url.search_params();
    if let Some(width) = request.width {
        params.set("width", &width.to_string());
    }
    if let Some(height) = request.height {
        params.set("height", &height.to_string());
    }
    if let Some(referer) = &request.referer {
        params.set("referer", referer);
    }

    Ok(url.href())
}

// =============================================================================
// Retry Policy
// =============================================================================

/// Backoff delay for the retry that follows attempt `attempt`, without
/// jitter: `base * 2^attempt`, capped at [`MAX_BACKOFF_MS`].
pub fn backoff_delay_ms(base_delay_ms: u64, attempt: u32) -> u64 {
    let shift = attempt.min(16);
    base_delay_ms
        .saturating_mul(1u64 << shift)
        .min(MAX_BACKOFF_MS)
}

async fn backoff_sleep(delay_ms: u64) {
    let jitter = (js_sys::Math::random() * MAX_JITTER_MS) as u64;
    gloo_timers::future::TimeoutFuture::new((delay_ms + jitter) as u32).await;
}

/// Run an operation with retry and backoff.
///
/// `max_attempts` is the total attempt budget, the initial call
/// included; zero is treated as one. The operation receives the
/// zero-based attempt number. Retrying stops on success, on a
/// non-retryable error, or when the budget is exhausted; the last
/// error is returned. The sleeper is injected so the policy can be
/// tested without timers.
pub async fn run_with_retry<T, Op, OpFut, Sleep, SleepFut>(
    max_attempts: u32,
    base_delay_ms: u64,
    mut op: Op,
    sleep: Sleep,
) -> Result<T, DeliveryError>
where
    Op: FnMut(u32) -> OpFut,
    OpFut: Future<Output = Result<T, DeliveryError>>,
    Sleep: Fn(u64) -> SleepFut,
    SleepFut: Future<Output = ()>,
{
    let attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            sleep(backoff_delay_ms(base_delay_ms, attempt - 1)).await;
        }

        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt + 1 >= attempts || !error.is_retryable() {
                    return Err(error);
                }
            }
        }

        attempt += 1;
    }
}

// =============================================================================
// Fetching
// =============================================================================

/// Issue one delivery request, bounded by the configured timeout.
async fn fetch_banner_once(
    ctx: &SdkContext,
    request: &DeliveryRequest,
) -> Result<DeliveryResponse, DeliveryError> {
    let window = dom::window().ok_or(DeliveryError::NoWindow)?;
    let url = build_delivery_url(&ctx.config.endpoint, request)?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let http_request =
        Request::new_with_str_and_init(&url, &opts).map_err(|_| DeliveryError::RequestCreationFailed)?;
    let _ = http_request.headers().set("Accept", "application/json");

    let promise = window.fetch_with_request(&http_request);
    let completed = match race_with_timeout(promise, ctx.config.timeout_ms as i32).await {
        RaceResult::Completed(value) => value,
        RaceResult::TimedOut => return Err(DeliveryError::Timeout),
        RaceResult::Error(message) => return Err(DeliveryError::Network(message)),
    };

    let response: Response = completed
        .dyn_into()
        .map_err(|_| DeliveryError::Network("unexpected fetch result".to_string()))?;

    if !response.ok() {
        return Err(DeliveryError::Http(response.status()));
    }

    let text_promise = response.text().map_err(|_| DeliveryError::ResponseReadFailed)?;
    let body = JsFuture::from(text_promise)
        .await
        .map_err(|_| DeliveryError::ResponseReadFailed)?;
    let body = body.as_string().ok_or(DeliveryError::ResponseReadFailed)?;

    parse_delivery_response(&body)
}

/// Fetch a banner, retrying transient failures per the retry policy.
pub async fn fetch_banner(
    ctx: &SdkContext,
    request: &DeliveryRequest,
) -> Result<DeliveryResponse, DeliveryError> {
    let attempts = if ctx.config.retry_enabled {
        ctx.config.retry_max_attempts
    } else {
        1
    };

    ctx.diagnostics.incr("delivery.requests");

    let result = run_with_retry(
        attempts,
        ctx.config.retry_delay_ms,
        |attempt| {
            if attempt > 0 {
                ctx.diagnostics.incr("delivery.retries");
                ctx.diagnostics.debug(
                    "retrying delivery request",
                    Some(json!({ "slot": request.slot_id, "attempt": attempt })),
                );
            }
            fetch_banner_once(ctx, request)
        },
        backoff_sleep,
    )
    .await;

    if result.is_err() {
        ctx.diagnostics.incr("delivery.failures");
    }

    result
}

/// Fetch a banner through the cache: serve a live entry when caching
/// is enabled, otherwise fetch and store the result under the response
/// TTL (falling back to the configured TTL).
pub async fn fetch_banner_cached(
    ctx: &SdkContext,
    request: &DeliveryRequest,
) -> Result<CachedBanner, DeliveryError> {
    if ctx.config.cache_enabled {
        let cached = ctx.cache.borrow_mut().get(&request.slot_id).cloned();
        if let Some(banner) = cached {
            ctx.diagnostics.incr("cache.hits");
            ctx.diagnostics
                .debug("cache hit", Some(json!({ "slot": request.slot_id })));
            return Ok(banner);
        }
        ctx.diagnostics.incr("cache.misses");
    }

    let response = fetch_banner(ctx, request).await?;
    let ttl_ms = response.ttl_ms.unwrap_or(ctx.config.cache_ttl_ms as f64);
    let banner = CachedBanner::from(response);

    if ctx.config.cache_enabled {
        ctx.cache
            .borrow_mut()
            .set(&request.slot_id, banner.clone(), ttl_ms);
    }

    Ok(banner)
}
