//! Authenticated API client for the work-order backend
//!
//! This crate provides the request pipeline used by every consumer of the
//! REST API:
//!
//! - **Token injection**: each request carries the current session's bearer token
//! - **Refresh and retry**: a 401 triggers one session refresh and one replay
//! - **Sign-out on failure**: an unrecoverable session signs out and redirects
//! - **Error extraction**: user-facing messages from backend error bodies
//!
//! Collaborators (transport, session provider, navigator) are injected, so
//! the retry logic can be exercised with fakes.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use workorder_api_client::{AuthConfig, ClientConfig, LazySupabaseAuth, WorkOrderClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let lookup = |key: &str| std::env::var(key).ok();
//!     let session = Arc::new(LazySupabaseAuth::new(AuthConfig::from_env_with(lookup)));
//!     let client = WorkOrderClient::with_config(ClientConfig::from_env()?, session)?;
//!
//!     let health = client.health().check().await?;
//!     println!("Service status: {}", health.status);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod extract;
pub mod models;
pub mod navigator;
pub mod session;
pub mod supabase;
pub mod transport;

pub use client::WorkOrderClient;
pub use config::{AuthConfig, ClientConfig};
pub use error::{ApiError, ApiResult, AuthError, AuthResult};
pub use extract::extract_api_error;
pub use navigator::{LogNavigator, Navigator};
pub use session::{AuthChange, AuthChangeEvent, Session, SessionProvider, User};
pub use supabase::{LazySupabaseAuth, SupabaseAuth};
pub use transport::{ApiRequest, HttpTransport, RawResponse, ReqwestTransport};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::WorkOrderClient;
    pub use crate::config::{AuthConfig, ClientConfig};
    pub use crate::endpoints::{AuthApi, HealthApi, LocationsApi, WorkOrdersApi};
    pub use crate::error::{ApiError, ApiResult, AuthError, AuthResult};
    pub use crate::models::{
        Location, WorkOrder, WorkOrderCreate, WorkOrderPriority, WorkOrderQuery, WorkOrderStatus,
        WorkOrderUpdate,
    };
    pub use crate::session::{Session, SessionProvider};
}
