//! Core utilities for the work-order client toolkit
//!
//! This crate provides shared functionality used by the API client, the
//! geocoding service and the command-line front end:
//!
//! - **Error handling**: Structured errors with codes, context and recovery suggestions
//! - **Retry**: Async retry with exponential backoff
//! - **Cache**: In-memory time-to-live cache
//! - **Configuration**: TOML-based configuration with environment overrides
//!
//! # Example
//!
//! ```rust,no_run
//! use workorder_core::config::Config;
//!
//! let config = Config::load_with_env(None).expect("Invalid configuration");
//! println!("API at {}", config.schema.api.base_url);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod error;
pub mod retry;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CacheStats, TtlCache};
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{Error, ErrorCode, Result, ResultExt};
    pub use crate::retry::{retry_async, RetryConfig, RetryError, RetryResult};
}
