//! Core SDK logic.
//!
//! This module provides:
//! - [`validation`] and [`sanitize`] gating everything that crosses the
//!   trust boundary
//! - [`client`] fetching banners with timeout and retry
//! - [`cache`] avoiding redundant delivery round-trips
//! - [`render`] injecting banners and [`fallback`] degrading gracefully

pub mod cache;
pub mod client;
pub mod error;
pub mod fallback;
pub mod render;
pub mod sanitize;
pub mod validation;

pub use cache::{BannerCache, CachedBanner};
pub use client::{DeliveryRequest, DeliveryResponse, fetch_banner, fetch_banner_cached};
pub use error::{DeliveryError, RenderError, SdkError};
pub use render::{RenderMethod, RenderOptions, RenderResult, render_banner};
pub use sanitize::{is_safe_html, is_safe_url, sanitize_html};
pub use validation::{ValidationError, ValidationErrorCode, validate_slot_id};
