//! Toast notifications
//!
//! [`ToastStore`] holds the visible toasts and publishes every change through
//! a `tokio::sync::watch` channel. A toast with a non-zero duration removes
//! itself after that duration on the tokio runtime.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// How long a toast stays up unless told otherwise
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(5000);

/// Toast flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    /// Green confirmation
    Success,
    /// Red failure notice
    Error,
    /// Amber caution
    Warning,
    /// Neutral information
    Info,
}

/// A single notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    /// Unique id, `toast-<n>`
    pub id: String,
    /// Flavor, serialized as `type`
    #[serde(rename = "type")]
    pub kind: ToastKind,
    /// Text shown to the user
    pub message: String,
    /// Zero means the toast stays until removed
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

struct Inner {
    toasts: watch::Sender<Vec<Toast>>,
    next_id: AtomicU64,
}

/// Observable list of toasts; clones share the same list
#[derive(Clone)]
pub struct ToastStore {
    inner: Arc<Inner>,
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToastStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastStore").field("toasts", &*self.inner.toasts.borrow()).finish()
    }
}

impl ToastStore {
    /// Empty store
    pub fn new() -> Self {
        let (toasts, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                toasts,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Show a toast and return its id.
    ///
    /// Auto-removal needs a tokio runtime; outside one the toast stays until
    /// removed by hand.
    pub fn add(&self, kind: ToastKind, message: impl Into<String>, duration: Duration) -> String {
        let id = format!("toast-{}", self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let toast = Toast {
            id: id.clone(),
            kind,
            message: message.into(),
            duration,
        };
        self.inner.toasts.send_modify(|toasts| toasts.push(toast));

        if !duration.is_zero() {
            self.schedule_removal(id.clone(), duration);
        }

        id
    }

    /// Success toast with the default duration
    pub fn success(&self, message: impl Into<String>) -> String {
        self.add(ToastKind::Success, message, DEFAULT_TOAST_DURATION)
    }

    /// Error toast with the default duration
    pub fn error(&self, message: impl Into<String>) -> String {
        self.add(ToastKind::Error, message, DEFAULT_TOAST_DURATION)
    }

    /// Warning toast with the default duration
    pub fn warning(&self, message: impl Into<String>) -> String {
        self.add(ToastKind::Warning, message, DEFAULT_TOAST_DURATION)
    }

    /// Info toast with the default duration
    pub fn info(&self, message: impl Into<String>) -> String {
        self.add(ToastKind::Info, message, DEFAULT_TOAST_DURATION)
    }

    /// Remove a toast; returns whether it was present
    pub fn remove(&self, id: &str) -> bool {
        self.inner.toasts.send_if_modified(|toasts| {
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            toasts.len() != before
        })
    }

    /// Remove every toast
    pub fn clear(&self) {
        self.inner.toasts.send_modify(Vec::clear);
    }

    /// Snapshot of the visible toasts, oldest first
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.toasts.borrow().clone()
    }

    /// Receiver notified on every change
    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.inner.toasts.subscribe()
    }

    fn schedule_removal(&self, id: String, after: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(component = "Toast", %id, "No runtime, toast will not auto-dismiss");
            return;
        };

        let store: Weak<Inner> = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(inner) = store.upgrade() {
                ToastStore { inner }.remove(&id);
            }
        });
    }
}
