//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during a geocoding lookup.
#[derive(Debug, Error)]
pub enum GeoError {
    /// HTTP request to the geocoder failed
    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Geocoder answered with a non-success status
    #[error("Geocoding failed ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Reason phrase or body excerpt
        message: String,
    },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Provider misconfiguration
    #[error("Geocoder configuration error: {0}")]
    Config(String),
}

/// Error code for integration with workorder-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Transport failure
    Request = 10001,
    /// Non-success HTTP status
    Status = 10002,
    /// JSON parsing error
    JsonParsing = 10004,
    /// Provider misconfiguration
    Config = 10005,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::Request(_) => GeoErrorCode::Request,
            GeoError::Status { .. } => GeoErrorCode::Status,
            GeoError::JsonError(_) => GeoErrorCode::JsonParsing,
            GeoError::Config(_) => GeoErrorCode::Config,
        }
    }
}

impl From<GeoError> for workorder_core::Error {
    fn from(err: GeoError) -> Self {
        let converted = match err {
            GeoError::Request(_) | GeoError::Status { .. } => {
                workorder_core::Error::new(workorder_core::ErrorCode::RequestFailed, err.to_string())
            }
            GeoError::JsonError(_) => workorder_core::Error::geocoding(err.to_string()),
            GeoError::Config(_) => {
                workorder_core::Error::new(workorder_core::ErrorCode::InvalidConfigValue, err.to_string())
            }
        };
        converted.with_source(err)
    }
}
