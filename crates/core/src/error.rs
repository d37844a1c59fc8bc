//! Structured error handling with codes, context and recovery suggestions
//!
//! This module provides structured error types with:
//! - Error codes for programmatic handling
//! - Detailed error context
//! - Recovery suggestions
//! - Serializable error reports

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    /// Operation took longer than allowed
    Timeout = 1003,

    // IO errors (2xxx)
    /// Generic IO failure
    IoError = 2000,
    /// File does not exist
    FileNotFound = 2001,
    /// Access to a file was refused
    PermissionDenied = 2002,

    // Configuration errors (3xxx)
    /// Generic configuration problem
    ConfigError = 3000,
    /// Explicit configuration file is missing
    ConfigNotFound = 3001,
    /// Configuration file is not valid TOML
    ConfigParseError = 3002,
    /// A setting has an unusable value
    InvalidConfigValue = 3004,
    /// Required environment variable is unset
    MissingEnvVar = 3005,

    // Auth errors (4xxx)
    /// Session provider rejected the call
    AuthError = 4000,
    /// Backend answered 401
    Unauthorized = 4001,
    /// No session is available
    SessionExpired = 4002,

    // Network errors (5xxx)
    /// Request could not be sent or answered
    NetworkError = 5000,
    /// Upstream service call failed
    RequestFailed = 5001,
    /// Backend answered with an unexpected status
    UnexpectedStatus = 5002,
    /// Every retry attempt failed
    RetriesExhausted = 5003,

    // Validation errors (6xxx)
    /// Payload could not be decoded
    InvalidFormat = 6002,

    // Geocoding errors (7xxx)
    /// Geocoder returned something unusable
    GeocodingError = 7000,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            4 => "Auth",
            5 => "Network",
            6 => "Validation",
            7 => "Geocoding",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    // Convenience constructors

    /// Generic configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Explicit configuration path that does not exist
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a workorder.toml file or pass --config with a valid path")
    }

    /// Unset environment variable
    pub fn missing_env(var: &str) -> Self {
        Self::new(
            ErrorCode::MissingEnvVar,
            format!("Missing environment variable: {}", var),
        )
        .with_suggestion(format!("Export {} or set it in workorder.toml", var))
    }

    /// Backend rejected the session
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
            .with_suggestion("Sign in again to obtain a fresh session")
    }

    /// Transport-level failure
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message)
    }

    /// `operation` failed on every one of its `attempts`
    pub fn retries_exhausted(operation: &str, attempts: u32) -> Self {
        Self::new(
            ErrorCode::RetriesExhausted,
            format!("{} failed after {} attempts", operation, attempts),
        )
    }

    /// Unusable geocoder response
    pub fn geocoding(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GeocodingError, message)
    }
}

/// Serializable error report for logging and API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code
    pub code: ErrorCode,
    /// Code as displayed, e.g. `E4001`
    pub code_str: String,
    /// Category of the code
    pub category: String,
    /// Human-readable message
    pub message: String,
    /// Additional context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Recovery suggestion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Source error text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::InvalidFormat, format!("JSON parse error: {}", err))
            .with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Attach a recovery suggestion to the error
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}
