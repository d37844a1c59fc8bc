//! Configuration schema definitions
//!
//! Every section has serde defaults, so a partial (or empty) file is valid.

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    /// `[api]` section
    #[serde(default)]
    pub api: ApiSettings,

    /// `[auth]` section
    #[serde(default)]
    pub auth: AuthSettings,

    /// `[geocoding]` section
    #[serde(default)]
    pub geocoding: GeocodingSettings,

    /// `[logging]` section
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// REST backend settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    /// Base URL of the work-order API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Overall request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Where the user is sent when the session cannot be recovered
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            login_path: default_login_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_login_path() -> String {
    "/login".to_string()
}

/// Session provider settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthSettings {
    /// Supabase project URL
    #[serde(default)]
    pub supabase_url: Option<String>,

    /// Supabase anonymous (public) key
    #[serde(default)]
    pub anon_key: Option<String>,
}

/// Geocoding provider and cache settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeocodingSettings {
    /// Geocoder base URL (Nominatim compatible)
    #[serde(default = "default_geocoder_url")]
    pub endpoint: String,

    /// User-Agent sent to the geocoder
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// How long results (including failures) stay cached
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Pause between uncached lookups, and the backoff base
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Lookup attempts before giving up on an address
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            endpoint: default_geocoder_url(),
            user_agent: default_user_agent(),
            cache_ttl_secs: default_cache_ttl_secs(),
            request_delay_ms: default_request_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    "WorkOrderManagementApp/1.0".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_request_delay_ms() -> u64 {
    100
}

fn default_max_attempts() -> u32 {
    3
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Debug mode lowers the level to `debug` and keeps captured logs
    #[serde(default)]
    pub debug: bool,

    /// Capacity of the in-memory log store
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Optional log file path
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            debug: false,
            max_entries: default_max_entries(),
            file: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_max_entries() -> usize {
    1000
}
