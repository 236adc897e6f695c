//! Structured logging with levels and a bounded in-memory history.

use std::cell::{Cell, RefCell};

use serde_json::Value;

use crate::utils::{RingBuffer, now_ms};

/// Prefix attached to every console line.
const LOG_PREFIX: &str = "[adkit]";

/// Maximum retained log entries.
const MAX_LOG_ENTRIES: usize = 1000;

/// Log severity, ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Silent => "SILENT",
        }
    }
}

/// A retained log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp_ms: f64,
    pub message: String,
    pub context: Option<Value>,
}

/// Leveled logger with a bounded entry history.
///
/// Entries below the current level are dropped. Console output can be
/// disabled independently of retention.
#[derive(Debug)]
pub struct Logger {
    level: Cell<LogLevel>,
    console: bool,
    entries: RefCell<RingBuffer<LogEntry>>,
}

impl Logger {
    pub fn new(level: LogLevel, console: bool) -> Self {
        Self {
            level: Cell::new(level),
            console,
            entries: RefCell::new(RingBuffer::new(MAX_LOG_ENTRIES)),
        }
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.set(level);
    }

    pub fn level(&self) -> LogLevel {
        self.level.get()
    }

    pub fn debug(&self, message: &str, context: Option<Value>) {
        self.log(LogLevel::Debug, message, context);
    }

    pub fn info(&self, message: &str, context: Option<Value>) {
        self.log(LogLevel::Info, message, context);
    }

    pub fn warn(&self, message: &str, context: Option<Value>) {
        self.log(LogLevel::Warn, message, context);
    }

    pub fn error(&self, message: &str, context: Option<Value>) {
        self.log(LogLevel::Error, message, context);
    }

    /// All retained entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().to_vec()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    fn log(&self, level: LogLevel, message: &str, context: Option<Value>) {
        if level < self.level.get() || self.level.get() == LogLevel::Silent {
            return;
        }

        if self.console {
            emit_console(level, message, context.as_ref());
        }

        self.entries.borrow_mut().push(LogEntry {
            level,
            timestamp_ms: now_ms(),
            message: message.to_string(),
            context,
        });
    }
}

#[cfg(target_arch = "wasm32")]
fn emit_console(level: LogLevel, message: &str, context: Option<&Value>) {
    use wasm_bindgen::JsValue;

    let line = format_line(level, message, context);
    let value = JsValue::from_str(&line);
    match level {
        LogLevel::Warn => web_sys::console::warn_1(&value),
        LogLevel::Error => web_sys::console::error_1(&value),
        _ => web_sys::console::log_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit_console(level: LogLevel, message: &str, context: Option<&Value>) {
    eprintln!("{}", format_line(level, message, context));
}

fn format_line(level: LogLevel, message: &str, context: Option<&Value>) -> String {
    match context {
        Some(value) => format!("{} {} {} {}", LOG_PREFIX, level.as_str(), message, value),
        None => format!("{} {} {}", LOG_PREFIX, level.as_str(), message),
    }
}
