//! Bounded log of named diagnostic events.

use std::cell::RefCell;

use serde_json::Value;

use crate::utils::{RingBuffer, now_ms};

/// Maximum retained events.
const MAX_EVENTS: usize = 1000;

/// A recorded diagnostic event.
#[derive(Debug, Clone)]
pub struct SdkEvent {
    pub event_type: String,
    pub timestamp_ms: f64,
    pub data: Value,
}

/// Bounded, append-only event history.
#[derive(Debug)]
pub struct EventLog {
    events: RefCell<RingBuffer<SdkEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_EVENTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: RefCell::new(RingBuffer::new(capacity)),
        }
    }

    /// Record a named event with an arbitrary payload.
    pub fn record(&self, event_type: &str, data: Value) {
        self.events.borrow_mut().push(SdkEvent {
            event_type: event_type.to_string(),
            timestamp_ms: now_ms(),
            data,
        });
    }

    /// All retained events, oldest first.
    pub fn recent(&self) -> Vec<SdkEvent> {
        self.events.borrow().to_vec()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_in_order() {
        let log = EventLog::new();
        log.record("render.phase", json!({ "phase": "requested" }));
        log.record("render.phase", json!({ "phase": "rendered" }));

        let events = log.recent();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data["phase"], "requested");
    }

    #[test]
    fn history_is_bounded() {
        let log = EventLog::with_capacity(2);
        for i in 0..5 {
            log.record("tick", json!({ "i": i }));
        }
        let events = log.recent();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data["i"], 3);
    }
}
