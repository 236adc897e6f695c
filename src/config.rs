//! SDK configuration.
//!
//! Centralizes the defaults for delivery, caching, retry, and rendering,
//! and defines the host-supplied [`SdkConfig`] with its validation rules.

use serde::Deserialize;

use crate::core::validation::{
    ValidationResult, validate_batch, validate_cache_ttl, validate_csp_nonce, validate_retry_attempts,
    validate_retry_delay, validate_timeout, validate_url,
};

// =============================================================================
// Defaults
// =============================================================================

/// Delivery endpoint used when the host supplies none. Relative paths
/// are resolved against the embedding page.
pub const DEFAULT_ENDPOINT: &str = "/api/v1";

/// Per-request delivery timeout.
pub const DEFAULT_TIMEOUT_MS: u32 = 5_000;

/// Banner cache time-to-live.
pub const DEFAULT_CACHE_TTL_MS: u64 = 300_000;

/// Maximum live cache entries.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 32;

/// Total delivery attempts, the initial request included.
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;

/// Base backoff delay between attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Banner width used when the container size cannot be detected.
pub const DEFAULT_BANNER_WIDTH: u32 = 300;

/// Banner height used when the container size cannot be detected.
pub const DEFAULT_BANNER_HEIGHT: u32 = 250;

// =============================================================================
// Configuration
// =============================================================================

/// Host-supplied SDK configuration. Every field has a default, so the
/// host may pass any subset (or nothing at all).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SdkConfig {
    /// Base URL of the delivery service.
    pub endpoint: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u32,
    /// Enable diagnostics (console logging, counters, events).
    pub debug: bool,
    /// Serve repeat requests from the in-memory cache.
    pub cache_enabled: bool,
    /// Cache entry time-to-live in milliseconds.
    pub cache_ttl_ms: u64,
    /// Maximum live cache entries.
    pub cache_max_entries: usize,
    /// Retry failed delivery requests.
    pub retry_enabled: bool,
    /// Total delivery attempts, the initial request included.
    pub retry_max_attempts: u32,
    /// Base backoff delay in milliseconds.
    pub retry_delay_ms: u64,
    /// Render into a sandboxed iframe instead of injecting directly.
    pub iframe_mode: bool,
    /// Show the placeholder when delivery or rendering fails.
    pub fallback_enabled: bool,
    /// CSP nonce applied to injected style and script tags.
    pub nonce: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            debug: false,
            cache_enabled: true,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            retry_enabled: true,
            retry_max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            iframe_mode: false,
            fallback_enabled: true,
            nonce: String::new(),
        }
    }
}

impl SdkConfig {
    /// Check every field against its allowed range, failing on the first
    /// violation.
    pub fn validate(&self) -> ValidationResult {
        validate_batch([
            validate_url(&self.endpoint),
            validate_timeout(f64::from(self.timeout_ms)),
            validate_cache_ttl(self.cache_ttl_ms as f64),
            validate_retry_attempts(f64::from(self.retry_max_attempts)),
            validate_retry_delay(self.retry_delay_ms as f64),
            validate_csp_nonce(&self.nonce),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::ValidationErrorCode;

    #[test]
    fn defaults_are_valid() {
        assert!(SdkConfig::default().validate().is_ok());
    }

    #[test]
    fn deserializes_partial_camel_case_config() {
        let config: SdkConfig =
            serde_json::from_str(r#"{ "timeoutMs": 2500, "iframeMode": true }"#).unwrap();
        assert_eq!(config.timeout_ms, 2_500);
        assert!(config.iframe_mode);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn rejects_out_of_range_timeout() {
        let config = SdkConfig {
            timeout_ms: 50,
            ..SdkConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ValidationErrorCode::OutOfRange);
    }

    #[test]
    fn rejects_unsafe_endpoint() {
        let config = SdkConfig {
            endpoint: "javascript:alert(1)".into(),
            ..SdkConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ValidationErrorCode::InvalidUrl);
    }

    #[test]
    fn rejects_malformed_nonce() {
        let config = SdkConfig {
            nonce: "bad nonce!".into(),
            ..SdkConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ValidationErrorCode::InvalidNonceFormat);
    }
}
