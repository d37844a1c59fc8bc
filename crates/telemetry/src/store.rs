//! Bounded in-memory log capture
//!
//! [`LogStore`] is a `tracing_subscriber::Layer` that keeps the most recent
//! events so they can be filtered, exported as JSON or cleared at runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Severity of a captured entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Diagnostic detail
    Debug,
    /// Normal operation
    Info,
    /// Something looks off
    Warning,
    /// An operation failed
    Error,
    /// Error events flagged `critical = true`
    Critical,
}

impl LogLevel {
    /// Upper-case name as shown in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Map a tracing level; `critical` upgrades errors
    pub fn from_tracing(level: &Level, critical: bool) -> Self {
        match *level {
            Level::ERROR if critical => LogLevel::Critical,
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warning,
            Level::INFO => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the event was recorded
    pub timestamp: DateTime<Utc>,
    /// Severity
    pub level: LogLevel,
    /// Formatted message
    pub message: String,
    /// Value of the `component` field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Event target, usually the module path
    pub target: String,
    /// Remaining event fields
    #[serde(skip_serializing_if = "serde_json::Map::is_empty", default)]
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Session the event belongs to
    pub session_id: String,
}

/// Shared ring buffer of recent log entries
#[derive(Debug, Clone)]
pub struct LogStore {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    max_entries: usize,
}

impl LogStore {
    /// Create a store that keeps at most `max_entries` entries
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(max_entries.min(1024)))),
            max_entries,
        }
    }

    /// Append an entry, evicting the oldest when full
    pub fn push(&self, entry: LogEntry) {
        if self.max_entries == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        while entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Entries matching the optional filters, oldest first.
    ///
    /// `limit` keeps only the most recent matches.
    pub fn entries(
        &self,
        level: Option<LogLevel>,
        component: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<LogEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut matched: Vec<LogEntry> = entries
            .iter()
            .filter(|e| level.is_none_or(|l| e.level == l))
            .filter(|e| component.is_none_or(|c| e.component.as_deref() == Some(c)))
            .cloned()
            .collect();

        if let Some(limit) = limit {
            let skip = matched.len().saturating_sub(limit);
            matched.drain(..skip);
        }
        matched
    }

    /// Pretty-printed JSON array of every stored entry
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries(None, None, None))
    }

    /// Drop every stored entry
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collects event fields into JSON
#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    component: Option<String>,
    critical: bool,
    data: serde_json::Map<String, serde_json::Value>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        match field.name() {
            "message" => {
                self.message = Some(match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                });
            }
            "component" => {
                if let serde_json::Value::String(s) = value {
                    self.component = Some(s);
                }
            }
            "critical" => self.critical = value.as_bool().unwrap_or(false),
            name => {
                self.data.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, serde_json::Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, serde_json::Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, serde_json::Value::Bool(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.into());
    }
}

impl<S: Subscriber> Layer<S> for LogStore {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let metadata = event.metadata();
        self.push(LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::from_tracing(metadata.level(), fields.critical),
            message: fields.message.unwrap_or_default(),
            component: fields.component,
            target: metadata.target().to_string(),
            data: fields.data,
            session_id: crate::session_id().to_string(),
        });
    }
}
