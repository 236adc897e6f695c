//! Utility modules for DOM access, fetch plumbing, and data structures.
//!
//! Provides:
//! - [`RingBuffer`] - Fixed-capacity buffer for diagnostic entries
//! - [`race_with_timeout`] - Promise racing for bounded network calls
//! - [`dom`] - Safe accessors for browser globals
//! - [`now_ms`] - Millisecond clock shared by cache and diagnostics

pub mod dom;
mod fetch;
mod ring_buffer;
mod time;

pub use fetch::{RaceResult, fire_and_forget_get, race_with_timeout};
pub use ring_buffer::RingBuffer;
pub use time::now_ms;
