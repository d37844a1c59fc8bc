//! Structured logging for the work-order client toolkit
//!
//! This crate provides:
//! - Tracing subscriber setup (compact stderr output, optional JSON log file)
//! - A bounded in-memory [`LogStore`] that can be queried and exported
//! - Helpers for the structured events the client emits (API requests,
//!   user actions, navigation, form submissions)
//!
//! Every helper tags its event with a `component` field, which the store
//! uses for filtering.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

mod store;

pub use store::{LogEntry, LogLevel, LogStore};

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| format!("session_{}", Uuid::new_v4().simple()));

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Force debug level
    pub debug: bool,
    /// Print event targets
    pub show_target: bool,
    /// Print thread ids
    pub show_thread_ids: bool,
    /// Print source file names
    pub show_file: bool,
    /// Print source line numbers
    pub show_line_number: bool,
    /// Keep recent events in the in-memory store
    pub capture: bool,
    /// Capacity of the in-memory store
    pub max_entries: usize,
    /// Also write JSON lines to this file
    pub log_file: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug: false,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            capture: true,
            max_entries: 1000,
            log_file: None,
        }
    }
}

impl TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub fn effective_level(&self) -> &str {
        if self.debug { "debug" } else { &self.log_level }
    }
}

/// Keeps the log store reachable and the file writer flushing.
///
/// Dropping the guard flushes and stops the background file writer.
pub struct TelemetryGuard {
    store: LogStore,
    _file_guard: Option<WorkerGuard>,
}

impl TelemetryGuard {
    /// The in-memory store attached to the global subscriber
    pub fn store(&self) -> &LogStore {
        &self.store
    }
}

/// Initialize the telemetry system
pub fn init() -> anyhow::Result<TelemetryGuard> {
    init_with_config(TelemetryConfig::default())
}

/// Initialize with custom configuration
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    let (subscriber, guard) = build_subscriber(&config)?;

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!(
        component = "Logger",
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(guard)
}

/// Assemble the layered subscriber without installing it
fn build_subscriber(
    config: &TelemetryConfig,
) -> anyhow::Result<(impl tracing::Subscriber + Send + Sync + 'static, TelemetryGuard)> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.effective_level()));

    let (file_layer, file_guard) = match config.log_file {
        Some(ref path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), PathBuf::from);
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Log file path has no file name: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let store = LogStore::new(config.max_entries);
    let store_layer = config.capture.then(|| store.clone());

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(config.show_target)
                .with_thread_ids(config.show_thread_ids)
                .with_file(config.show_file)
                .with_line_number(config.show_line_number)
                .compact(),
        )
        .with(file_layer)
        .with(store_layer);

    Ok((
        subscriber,
        TelemetryGuard {
            store,
            _file_guard: file_guard,
        },
    ))
}

/// Record an outgoing API call.
///
/// Statuses of 400 and above are logged as errors, everything else at debug.
pub fn log_api_request(method: &str, url: &str, duration: Option<Duration>, status: Option<u16>) {
    let duration_ms = duration.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));

    match status {
        Some(code) if code >= 400 => tracing::error!(
            component = "ApiClient",
            kind = "api_request",
            method,
            url,
            duration_ms,
            status = code,
            "API {} {} failed with status {}",
            method,
            url,
            code
        ),
        _ => {
            let timing = duration_ms.map(|ms| format!(" ({ms}ms)")).unwrap_or_default();
            tracing::debug!(
                component = "ApiClient",
                kind = "api_request",
                method,
                url,
                duration_ms,
                status,
                "API {} {}{}",
                method,
                url,
                timing
            );
        }
    }
}

/// Record a user-initiated action
pub fn log_user_action(action: &str, component: &str, data: &serde_json::Value) {
    tracing::info!(
        component,
        kind = "user_action",
        action,
        data = %data,
        "User action: {}",
        action
    );
}

/// Record a navigation between two paths
pub fn log_navigation(from: &str, to: &str) {
    tracing::info!(
        component = "Router",
        kind = "navigation",
        from,
        to,
        "Navigation: {} → {}",
        from,
        to
    );
}

/// Record a form submission outcome
pub fn log_form_submission(form: &str, success: bool) {
    if success {
        tracing::info!(component = "Forms", kind = "form_submission", form, success, "Form {} submitted", form);
    } else {
        tracing::warn!(component = "Forms", kind = "form_submission", form, success, "Form {} failed", form);
    }
}

/// Record an unrecoverable condition
pub fn log_critical(message: &str, component: &str) {
    tracing::error!(critical = true, component, "{}", message);
}
