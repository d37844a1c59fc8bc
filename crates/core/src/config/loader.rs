//! Configuration file loading and environment overrides

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};

/// Base URL of the REST API
pub const ENV_API_BASE_URL: &str = "PUBLIC_API_BASE_URL";
/// Supabase project URL
pub const ENV_SUPABASE_URL: &str = "PUBLIC_SUPABASE_URL";
/// Supabase anonymous key
pub const ENV_SUPABASE_ANON_KEY: &str = "PUBLIC_SUPABASE_ANON_KEY";
/// Request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "WORKORDER_TIMEOUT_SECS";
/// Login redirect destination
pub const ENV_LOGIN_PATH: &str = "WORKORDER_LOGIN_PATH";
/// Geocoder base URL
pub const ENV_GEOCODER_URL: &str = "WORKORDER_GEOCODER_URL";
/// Debug switch, `true` enables debug logging
pub const ENV_DEBUG: &str = "WORKORDER_DEBUG";

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings
    pub schema: ConfigSchema,
    /// File the settings came from, if any
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path, or the first standard location
    /// that exists, or defaults.
    ///
    /// An explicit path that does not exist is an error; missing standard
    /// locations are not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Load from file, then apply the process environment on top
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        Self::load(path)?.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Override file values with environment-style values from `lookup`.
    ///
    /// Empty values are ignored. A timeout that is not a whole number of
    /// seconds fails with [`ErrorCode::InvalidConfigValue`].
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let schema = &mut self.schema;

        if let Some(url) = get(ENV_API_BASE_URL) {
            schema.api.base_url = url;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            schema.api.timeout_secs = secs.trim().parse().map_err(|_| {
                Error::new(
                    ErrorCode::InvalidConfigValue,
                    format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{secs}'"),
                )
                .with_suggestion(format!("Unset {ENV_TIMEOUT_SECS} or set it to a value like 30"))
            })?;
        }
        if let Some(login) = get(ENV_LOGIN_PATH) {
            schema.api.login_path = login;
        }
        if let Some(url) = get(ENV_SUPABASE_URL) {
            schema.auth.supabase_url = Some(url);
        }
        if let Some(key) = get(ENV_SUPABASE_ANON_KEY) {
            schema.auth.anon_key = Some(key);
        }
        if let Some(url) = get(ENV_GEOCODER_URL) {
            schema.geocoding.endpoint = url;
        }
        if get(ENV_DEBUG)
            .or_else(|| get("DEBUG"))
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            schema.logging.debug = true;
        }

        Ok(self)
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("workorder.toml"),
        PathBuf::from(".workorder.toml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("workorder").join("config.toml"));
    }

    candidates.into_iter().find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::new(
            ErrorCode::IoError,
            format!("Failed to read config file {}: {}", path.display(), e),
        )
        .with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::from(e).with_context(format!("While parsing {}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.api.base_url, "http://localhost:8000");
        assert_eq!(config.schema.api.timeout_secs, 30);
        assert_eq!(config.schema.geocoding.cache_ttl_secs, 86_400);
        assert_eq!(config.schema.geocoding.max_attempts, 3);
    }

    #[test]
    fn test_config_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_config_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://api.example.com\"\n\n[geocoding]\nrequest_delay_ms = 250"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.schema.api.base_url, "https://api.example.com");
        assert_eq!(config.schema.api.login_path, "/login");
        assert_eq!(config.schema.geocoding.request_delay_ms, 250);
        assert_eq!(config.path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = 3").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_BASE_URL, "https://api.example.com"),
            (ENV_SUPABASE_URL, "https://proj.supabase.co"),
            (ENV_SUPABASE_ANON_KEY, "anon"),
            (ENV_TIMEOUT_SECS, " 12 "),
            (ENV_LOGIN_PATH, ""),
            (ENV_DEBUG, "TRUE"),
        ]);

        let config = Config::default()
            .with_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.schema.api.base_url, "https://api.example.com");
        assert_eq!(config.schema.api.timeout_secs, 12);
        assert_eq!(config.schema.api.login_path, "/login");
        assert_eq!(config.schema.auth.supabase_url.as_deref(), Some("https://proj.supabase.co"));
        assert_eq!(config.schema.auth.anon_key.as_deref(), Some("anon"));
        assert!(config.schema.logging.debug);
    }

    #[test]
    fn test_env_rejects_unparsable_timeout() {
        let env = HashMap::from([(ENV_TIMEOUT_SECS, "abc")]);

        let err = Config::default()
            .with_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
        assert!(err.message.contains("WORKORDER_TIMEOUT_SECS"));
        assert!(err.message.contains("'abc'"));
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_env_blank_timeout_keeps_file_value() {
        let config = Config::default()
            .with_env_overrides(|k| (k == ENV_TIMEOUT_SECS).then(|| "  ".to_string()))
            .unwrap();
        assert_eq!(config.schema.api.timeout_secs, 30);
    }
}
