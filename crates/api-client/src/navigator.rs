//! User-agent navigation

/// Sends the user somewhere else, e.g. to the login page after an
/// unrecoverable auth failure.
pub trait Navigator: Send + Sync {
    /// Navigate to `destination`
    fn redirect(&self, destination: &str);
}

/// Records redirects as log events; used where there is no browser
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, destination: &str) {
        tracing::warn!(component = "Router", destination, "Redirecting to {}", destination);
    }
}
