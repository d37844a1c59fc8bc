//! Shared state for command execution

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use workorder_api_client::{AuthConfig, ClientConfig, LazySupabaseAuth, SessionProvider, WorkOrderClient};
use workorder_cli::output::print_json;
use workorder_cli::OutputFormat;
use workorder_core::config::Config;
use workorder_geo::{GeocodingConfig, GeocodingService, NominatimProvider};
use workorder_telemetry::{TelemetryConfig, TelemetryGuard};

/// Account used for password sign-in
pub const ENV_EMAIL: &str = "WORKORDER_EMAIL";
/// Password for [`ENV_EMAIL`]
pub const ENV_PASSWORD: &str = "WORKORDER_PASSWORD";

/// Configuration, API client and output format for one invocation
pub struct AppContext {
    pub config: Config,
    pub format: OutputFormat,
    session: Arc<LazySupabaseAuth>,
    client: WorkOrderClient,
}

impl AppContext {
    /// Load configuration and build the API client. No network access.
    pub fn load(path: Option<&Path>, format: OutputFormat) -> Result<Self> {
        let config = Config::load_with_env(path).context("failed to load configuration")?;

        let client_config = ClientConfig::from_settings(&config.schema);
        client_config.validate()?;

        let session = Arc::new(LazySupabaseAuth::new(AuthConfig::from_settings(&config.schema)));
        let client = WorkOrderClient::with_config(client_config, session.clone())?;

        Ok(Self {
            config,
            format,
            session,
            client,
        })
    }

    pub fn init_telemetry(&self, verbose: bool) -> Result<TelemetryGuard> {
        let logging = &self.config.schema.logging;
        workorder_telemetry::init_with_config(TelemetryConfig {
            log_level: if verbose { "debug".to_string() } else { logging.level.clone() },
            debug: logging.debug,
            capture: false,
            max_entries: logging.max_entries,
            log_file: logging.file.as_ref().map(PathBuf::from),
            ..TelemetryConfig::default()
        })
    }

    pub fn client(&self) -> &WorkOrderClient {
        &self.client
    }

    pub fn session(&self) -> &LazySupabaseAuth {
        &self.session
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Make sure a session exists, signing in from the environment if needed.
    ///
    /// Without credentials the command carries on unauthenticated and the
    /// backend decides.
    pub async fn sign_in(&self) -> Result<()> {
        if let Ok(Some(_)) = self.session.get_session().await {
            return Ok(());
        }

        let lookup = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        let (Some(email), Some(password)) = (lookup(ENV_EMAIL), lookup(ENV_PASSWORD)) else {
            debug!("No credentials in {ENV_EMAIL}/{ENV_PASSWORD}, continuing without a session");
            return Ok(());
        };

        self.session
            .sign_in_with_password(&email, &password)
            .await
            .map_err(|e| workorder_core::Error::from(e).with_context(format!("Signing in as {email}")))?;
        Ok(())
    }

    /// Geocoder built from the `[geocoding]` settings
    pub fn geocoder(&self) -> Result<GeocodingService<NominatimProvider>> {
        let settings = &self.config.schema.geocoding;
        let provider = NominatimProvider::from_settings(settings)?;
        Ok(GeocodingService::with_config(provider, GeocodingConfig::from_settings(settings)))
    }

    /// Print `value` as JSON, or run `text` in text mode
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce()) -> Result<()> {
        if self.is_json() {
            print_json(value)?;
        } else {
            text();
        }
        Ok(())
    }
}
