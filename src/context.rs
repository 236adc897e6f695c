//! SDK context: configuration, cache, nonce, and diagnostics in one place.
//!
//! All mutable state lives behind a [`SdkContext`] instead of module-level
//! globals, so hosts can run several isolated instances on one page. The
//! JS boundary keeps a thread-local default context; everything below it
//! takes `&SdkContext` explicitly.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::SdkConfig;
use crate::core::cache::BannerCache;
use crate::core::validation::{ValidationError, validate_csp_nonce};
use crate::telemetry::{Diagnostics, LogLevel};

/// Shared state for one SDK instance.
#[derive(Debug)]
pub struct SdkContext {
    pub config: SdkConfig,
    pub cache: RefCell<BannerCache>,
    nonce: RefCell<String>,
    pub diagnostics: Diagnostics,
}

impl SdkContext {
    /// Build a context from a validated configuration.
    pub fn new(config: SdkConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Build a context from the default configuration. Defaults always
    /// validate, so this cannot fail.
    pub fn with_defaults() -> Self {
        Self::build(SdkConfig::default())
    }

    fn build(config: SdkConfig) -> Self {
        let diagnostics = if config.debug {
            Diagnostics::new(LogLevel::Debug)
        } else {
            Diagnostics::disabled()
        };

        Self {
            cache: RefCell::new(BannerCache::new(config.cache_max_entries)),
            nonce: RefCell::new(config.nonce.clone()),
            config,
            diagnostics,
        }
    }

    /// Replace the CSP nonce applied to injected markup.
    pub fn set_nonce(&self, nonce: &str) -> Result<(), ValidationError> {
        validate_csp_nonce(nonce)?;
        *self.nonce.borrow_mut() = nonce.to_string();
        Ok(())
    }

    /// Current CSP nonce; empty when none is set.
    pub fn nonce(&self) -> String {
        self.nonce.borrow().clone()
    }

    /// Drop every cached banner.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Number of live cache entries.
    pub fn cache_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

// =============================================================================
// Default Context
// =============================================================================

thread_local! {
    static DEFAULT_CONTEXT: RefCell<Option<Rc<SdkContext>>> = const { RefCell::new(None) };
}

/// Install a fresh default context from the given configuration,
/// replacing any previous one.
pub fn init(config: SdkConfig) -> Result<Rc<SdkContext>, ValidationError> {
    let context = Rc::new(SdkContext::new(config)?);
    DEFAULT_CONTEXT.with(|slot| {
        *slot.borrow_mut() = Some(Rc::clone(&context));
    });
    Ok(context)
}

/// The current default context, creating one from defaults on first use.
pub fn current() -> Rc<SdkContext> {
    DEFAULT_CONTEXT.with(|slot| {
        let mut slot = slot.borrow_mut();
        match &*slot {
            Some(context) => Rc::clone(context),
            None => {
                let context = Rc::new(SdkContext::with_defaults());
                *slot = Some(Rc::clone(&context));
                context
            }
        }
    })
}

/// Drop the default context. The next [`current`] call recreates one
/// from defaults.
pub fn reset() {
    DEFAULT_CONTEXT.with(|slot| {
        *slot.borrow_mut() = None;
    });
}
