//! Diagnostics: structured logging, counters, and event records.
//!
//! Each concern is an independent module; [`Diagnostics`] composes them
//! by explicit delegation. Diagnostics never affect behavior: every
//! method is a no-op when the collector is disabled, and none can fail.

mod counters;
mod events;
mod logger;

pub use counters::Counters;
pub use events::{EventLog, SdkEvent};
pub use logger::{LogEntry, LogLevel, Logger};

use serde_json::Value;

/// Coordinator over the logging, counter, and event concerns.
#[derive(Debug)]
pub struct Diagnostics {
    enabled: bool,
    logger: Logger,
    counters: Counters,
    events: EventLog,
}

impl Diagnostics {
    /// Build an active collector at the given log level.
    pub fn new(level: LogLevel) -> Self {
        Self {
            enabled: true,
            logger: Logger::new(level, true),
            counters: Counters::new(),
            events: EventLog::new(),
        }
    }

    /// Build a collector where every operation is a no-op.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            logger: Logger::new(LogLevel::Silent, false),
            counters: Counters::new(),
            events: EventLog::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn debug(&self, message: &str, context: Option<Value>) {
        if self.enabled {
            self.logger.debug(message, context);
        }
    }

    pub fn info(&self, message: &str, context: Option<Value>) {
        if self.enabled {
            self.logger.info(message, context);
        }
    }

    pub fn warn(&self, message: &str, context: Option<Value>) {
        if self.enabled {
            self.logger.warn(message, context);
        }
    }

    pub fn error(&self, message: &str, context: Option<Value>) {
        if self.enabled {
            self.logger.error(message, context);
        }
    }

    /// Record a named event with an arbitrary payload.
    pub fn record_event(&self, event_type: &str, data: Value) {
        if self.enabled {
            self.events.record(event_type, data);
        }
    }

    /// Increment a named counter.
    pub fn incr(&self, name: &str) {
        if self.enabled {
            self.counters.incr(name);
        }
    }

    /// Current value of a named counter (zero when disabled or absent).
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name)
    }

    /// Retained events, oldest first.
    pub fn events(&self) -> Vec<SdkEvent> {
        self.events.recent()
    }

    /// Retained log entries, oldest first.
    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.logger.entries()
    }

    /// Clear all retained state. Exposed for tests and page teardown.
    pub fn reset(&self) {
        self.logger.clear();
        self.counters.reset();
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn disabled_collector_records_nothing() {
        let diagnostics = Diagnostics::disabled();
        diagnostics.error("dropped", None);
        diagnostics.record_event("dropped", json!({}));
        diagnostics.incr("dropped");

        assert!(diagnostics.log_entries().is_empty());
        assert!(diagnostics.events().is_empty());
        assert_eq!(diagnostics.counter("dropped"), 0);
    }

    #[test]
    fn enabled_collector_delegates_to_each_concern() {
        let diagnostics = Diagnostics::new(LogLevel::Debug);
        diagnostics.info("hello", Some(json!({ "slot": "ad-1" })));
        diagnostics.record_event("render.phase", json!({ "phase": "requested" }));
        diagnostics.incr("render.success");

        assert_eq!(diagnostics.log_entries().len(), 1);
        assert_eq!(diagnostics.events().len(), 1);
        assert_eq!(diagnostics.counter("render.success"), 1);

        diagnostics.reset();
        assert!(diagnostics.events().is_empty());
        assert_eq!(diagnostics.counter("render.success"), 0);
    }
}
