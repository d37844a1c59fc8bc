//! Error types for the API client

use crate::extract::extract_api_error;
use thiserror::Error;
use workorder_core::ErrorCode;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for session provider operations
pub type AuthResult<T> = Result<T, AuthError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Transport failed without a `reqwest` error (custom transports)
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing environment variable
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Message extracted from the body
        message: String,
        /// Parsed JSON body, when the body was JSON
        body: Option<serde_json::Value>,
    },
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing env var error
    pub fn missing_env(var: impl Into<String>) -> Self {
        Self::MissingEnvVar(var.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Build an error from a non-success status and its raw body.
    ///
    /// JSON bodies are kept and their message extracted; other bodies are
    /// used verbatim as the message.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<serde_json::Value>(body).ok();
        let fallback = status_text(status);
        let message = match parsed {
            Some(ref value) => extract_api_error(value, &fallback),
            None => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                if text.is_empty() { fallback } else { text }
            }
        };

        Self::ApiResponse {
            status,
            message,
            body: parsed,
        }
    }

    /// HTTP status, for response errors
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiResponse { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is an authorization failure (401)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if *status >= 500)
    }

    /// The most user-friendly message available.
    ///
    /// Response bodies go through [`extract_api_error`] with `fallback`;
    /// errors without a body report their own message.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::ApiResponse { body: Some(body), .. } => extract_api_error(body, fallback),
            Self::ApiResponse { message, .. } if !message.is_empty() => message.clone(),
            Self::ApiResponse { .. } => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

fn status_text(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map_or_else(|| format!("HTTP {status}"), str::to_string)
}

/// Session provider errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// HTTP request to the provider failed
    #[error("Auth request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider rejected the call
    #[error("Auth provider error ({status}): {message}")]
    Provider {
        /// HTTP status code
        status: u16,
        /// Provider message
        message: String,
    },

    /// No current session to act on
    #[error("No active session")]
    NoSession,

    /// Provider URL or key is missing
    #[error("Auth provider not configured: {0}")]
    NotConfigured(String),

    /// Operation not offered by this provider
    #[error("Operation not supported by this session provider: {0}")]
    Unsupported(&'static str),

    /// Malformed provider response
    #[error("Invalid auth response: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    /// Create a provider error
    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: message.into(),
        }
    }
}

impl From<ApiError> for workorder_core::Error {
    fn from(err: ApiError) -> Self {
        let converted = match &err {
            ApiError::ApiResponse { status: 401, .. } => Self::unauthorized(err.to_string()),
            ApiError::ApiResponse { .. } => Self::new(ErrorCode::UnexpectedStatus, err.to_string()),
            ApiError::Request(e) if e.is_timeout() => Self::new(ErrorCode::Timeout, err.to_string()),
            ApiError::Request(_) | ApiError::Transport(_) => Self::network(err.to_string()),
            ApiError::Json(_) => Self::new(ErrorCode::InvalidFormat, err.to_string()),
            ApiError::Config(_) => Self::config(err.to_string()),
            ApiError::MissingEnvVar(var) => Self::missing_env(var),
        };
        converted.with_source(err)
    }
}

impl From<AuthError> for workorder_core::Error {
    fn from(err: AuthError) -> Self {
        let converted = match &err {
            AuthError::Request(_) => Self::network(err.to_string()),
            AuthError::NoSession => Self::new(ErrorCode::SessionExpired, err.to_string())
                .with_suggestion("Sign in again to obtain a fresh session"),
            AuthError::NotConfigured(_) => Self::config(err.to_string()).with_suggestion(
                "Set PUBLIC_SUPABASE_URL and PUBLIC_SUPABASE_ANON_KEY or fill in [auth] in workorder.toml",
            ),
            AuthError::Json(_) => Self::new(ErrorCode::InvalidFormat, err.to_string()),
            AuthError::Provider { .. } | AuthError::Unsupported(_) => {
                Self::new(ErrorCode::AuthError, err.to_string())
            }
        };
        converted.with_source(err)
    }
}
