//! Configuration for the work-order API client
//!
//! Values come from environment-style variables or from the shared TOML
//! configuration, with sensible defaults.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use workorder_core::config::{
    ConfigSchema, ENV_API_BASE_URL, ENV_LOGIN_PATH, ENV_SUPABASE_ANON_KEY, ENV_SUPABASE_URL,
    ENV_TIMEOUT_SECS,
};

/// Default REST backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default login destination for unrecoverable auth failures
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST API
    pub base_url: String,
    /// Overall request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Redirect destination when a session cannot be refreshed
    pub login_path: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            user_agent: format!("workorder-api-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create configuration from the process environment
    ///
    /// Reads the following environment variables:
    /// - `PUBLIC_API_BASE_URL`: Base URL of the REST API
    /// - `WORKORDER_TIMEOUT_SECS`: Request timeout in seconds
    /// - `WORKORDER_LOGIN_PATH`: Login redirect destination
    pub fn from_env() -> ApiResult<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Create configuration from an environment-style lookup
    pub fn from_env_with<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_BASE_URL) {
            config.base_url = url;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ApiError::config(format!("{ENV_TIMEOUT_SECS} must be a number of seconds, got '{raw}'"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = get(ENV_LOGIN_PATH) {
            config.login_path = path;
        }

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from the shared configuration file schema
    #[must_use]
    pub fn from_settings(schema: &ConfigSchema) -> Self {
        Self {
            base_url: schema.api.base_url.clone(),
            timeout: Duration::from_secs(schema.api.timeout_secs),
            login_path: schema.api.login_path.clone(),
            ..Self::default()
        }
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set the login destination
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Builder-style method to set the User-Agent
    #[must_use]
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Join a relative path onto the base URL; absolute URLs pass through
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        if !self.login_path.starts_with('/') {
            return Err(ApiError::config("login_path must be an absolute path"));
        }

        Ok(())
    }
}

/// Session provider (Supabase) configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Project URL
    pub supabase_url: Option<String>,
    /// Anonymous (public) key
    pub anon_key: Option<String>,
}

impl AuthConfig {
    /// Read `PUBLIC_SUPABASE_URL` and `PUBLIC_SUPABASE_ANON_KEY`
    #[must_use]
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            supabase_url: get(ENV_SUPABASE_URL),
            anon_key: get(ENV_SUPABASE_ANON_KEY),
        }
    }

    /// Take the `[auth]` section of the shared configuration
    #[must_use]
    pub fn from_settings(schema: &ConfigSchema) -> Self {
        Self {
            supabase_url: schema.auth.supabase_url.clone(),
            anon_key: schema.auth.anon_key.clone(),
        }
    }

    /// URL and key, or the first missing variable as an error
    pub fn require(&self) -> ApiResult<(&str, &str)> {
        let url = self
            .supabase_url
            .as_deref()
            .ok_or_else(|| ApiError::missing_env(ENV_SUPABASE_URL))?;
        let key = self
            .anon_key
            .as_deref()
            .ok_or_else(|| ApiError::missing_env(ENV_SUPABASE_ANON_KEY))?;
        Ok((url, key))
    }
}
