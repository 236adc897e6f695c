//! Custom error types for the SDK.
//!
//! Provides structured error handling with meaningful error messages
//! and proper error categorization for each domain:
//!
//! - [`ValidationError`] - Bad input rejected before any network activity
//! - [`DeliveryError`] - Network/server failures for delivery fetches
//! - [`RenderError`] - DOM injection failures
//! - [`SdkError`] - Umbrella type returned across public boundaries
//!
//! Sanitization has no error type: the sanitizer degrades to empty output
//! rather than failing.

use std::fmt;

use crate::core::validation::ValidationError;

/// Network/delivery errors for banner fetches.
#[derive(Debug, Clone)]
pub enum DeliveryError {
    /// Browser window not available
    NoWindow,
    /// Failed to create the delivery request
    RequestCreationFailed,
    /// Network request failed (connection reset, CORS, etc.)
    Network(String),
    /// Request exceeded the per-attempt timeout
    Timeout,
    /// HTTP error response (non-2xx status)
    Http(u16),
    /// Failed to read the response body
    ResponseReadFailed,
    /// Response body did not match the delivery wire contract
    InvalidResponse(String),
}

impl DeliveryError {
    /// Whether the retry policy may re-issue the request.
    ///
    /// Decided by error kind only: network failures, timeouts, and
    /// HTTP 408/429/5xx are transient. Everything else stops retrying
    /// immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::Http(status) => *status == 408 || *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => write!(f, "Browser window not available"),
            Self::RequestCreationFailed => write!(f, "Failed to create delivery request"),
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::Timeout => write!(f, "Delivery request timed out"),
            Self::Http(status) => write!(f, "HTTP error: {}", status),
            Self::ResponseReadFailed => write!(f, "Failed to read delivery response"),
            Self::InvalidResponse(msg) => write!(f, "Invalid delivery response: {}", msg),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// DOM injection errors raised by the renderer.
#[derive(Debug, Clone)]
pub enum RenderError {
    /// Target container is not attached to the document tree
    ContainerDetached,
    /// Browser document not available
    NoDocument,
    /// Failed to create an injection element
    ElementCreationFailed(String),
    /// Failed to attach content to the container
    InjectionFailed(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContainerDetached => write!(f, "Container is not attached to the document"),
            Self::NoDocument => write!(f, "Browser document not available"),
            Self::ElementCreationFailed(what) => write!(f, "Failed to create element: {}", what),
            Self::InjectionFailed(msg) => write!(f, "Injection failed: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// Umbrella error returned across the SDK's public boundaries.
#[derive(Debug, Clone)]
pub enum SdkError {
    Validation(ValidationError),
    Delivery(DeliveryError),
    Render(RenderError),
}

impl fmt::Display for SdkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::Delivery(e) => write!(f, "Delivery error: {}", e),
            Self::Render(e) => write!(f, "Render error: {}", e),
        }
    }
}

impl std::error::Error for SdkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Delivery(e) => Some(e),
            Self::Render(e) => Some(e),
        }
    }
}

impl From<ValidationError> for SdkError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DeliveryError> for SdkError {
    fn from(e: DeliveryError) -> Self {
        Self::Delivery(e)
    }
}

impl From<RenderError> for SdkError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}
