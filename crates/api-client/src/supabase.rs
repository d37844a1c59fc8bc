//! Supabase (GoTrue) session provider
//!
//! Talks to the `/auth/v1` REST endpoints, keeps the current session in
//! memory and broadcasts every state change.

use crate::config::AuthConfig;
use crate::error::{ApiError, AuthError, AuthResult};
use crate::session::{
    AuthChange, AuthChangeEvent, Session, SessionProvider, SignUpOutcome, User, UserAttributes,
};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::RwLock;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// API key header for Supabase
const APIKEY_HEADER: &str = "apikey";

const EVENT_CAPACITY: usize = 16;

/// GoTrue-backed [`SessionProvider`]
#[derive(Debug)]
pub struct SupabaseAuth {
    http: Client,
    auth_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthChange>,
}

impl SupabaseAuth {
    /// Create a provider for the project at `url`
    pub fn new(url: &str, anon_key: &str) -> AuthResult<Self> {
        Self::with_sender(url, anon_key, broadcast::channel(EVENT_CAPACITY).0)
    }

    /// Create a provider from configuration
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let (url, key) = config
            .require()
            .map_err(|e| AuthError::NotConfigured(e.to_string()))?;
        Self::new(url, key)
    }

    fn with_sender(url: &str, anon_key: &str, events: broadcast::Sender<AuthChange>) -> AuthResult<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            auth_url: format!("{}/auth/v1", url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
            session: RwLock::new(None),
            events,
        })
    }

    /// Install a session obtained elsewhere
    pub fn set_session(&self, session: Session) {
        self.store(Some(session.clone()));
        self.emit(AuthChangeEvent::SignedIn, Some(session));
    }

    fn current(&self) -> Option<Session> {
        self.session.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn store(&self, session: Option<Session>) {
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = session;
    }

    fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        // No receivers is fine
        let _ = self.events.send(AuthChange { event, session });
    }

    async fn call<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> AuthResult<T> {
        let response = request
            .header(APIKEY_HEADER, &self.anon_key)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        if !(200..300).contains(&status) {
            return Err(provider_error(status, &body));
        }
        let body: &[u8] = if body.is_empty() { b"null" } else { &body };
        Ok(serde_json::from_slice(body)?)
    }

    async fn token_grant(&self, grant_type: &str, payload: Value) -> AuthResult<Session> {
        let url = format!("{}/token", self.auth_url);
        let mut session: Session = self
            .call(self.http.post(&url).query(&[("grant_type", grant_type)]).json(&payload))
            .await?;
        session.stamp_expiry();
        Ok(session)
    }
}

/// Build a provider error from a GoTrue error body
fn provider_error(status: u16, body: &[u8]) -> AuthError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| format!("HTTP {status}"));
    AuthError::provider(status, message)
}

#[async_trait]
impl SessionProvider for SupabaseAuth {
    async fn get_session(&self) -> AuthResult<Option<Session>> {
        match self.current() {
            Some(session) if session.is_expired() && session.refresh_token.is_some() => {
                debug!(component = "Auth", "Stored session expired, refreshing");
                self.refresh_session().await.map(Some)
            }
            other => Ok(other),
        }
    }

    async fn refresh_session(&self) -> AuthResult<Session> {
        let refresh_token = self
            .current()
            .and_then(|s| s.refresh_token)
            .ok_or(AuthError::NoSession)?;

        let session = self
            .token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await?;
        self.store(Some(session.clone()));
        self.emit(AuthChangeEvent::TokenRefreshed, Some(session.clone()));
        info!(component = "Auth", "Session refreshed");
        Ok(session)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let Some(session) = self.current() else {
            return Ok(());
        };

        // Local state is cleared even when the remote call fails
        self.store(None);
        self.emit(AuthChangeEvent::SignedOut, None);

        let url = format!("{}/logout", self.auth_url);
        let result: AuthResult<Value> = self
            .call(self.http.post(&url).bearer_auth(&session.access_token))
            .await;
        if let Err(ref e) = result {
            warn!(component = "Auth", error = %e, "Remote sign-out failed");
        }
        result.map(|_| ())
    }

    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Session> {
        let session = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;
        self.store(Some(session.clone()));
        self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));
        info!(component = "Auth", "Signed in");
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        data: Option<Value>,
    ) -> AuthResult<SignUpOutcome> {
        let url = format!("{}/signup", self.auth_url);
        let mut payload = json!({ "email": email, "password": password });
        if let Some(data) = data {
            payload["data"] = data;
        }
        let body: Value = self.call(self.http.post(&url).json(&payload)).await?;

        // Auto-confirmed projects answer with a session, others with the user
        if body.get("access_token").is_some() {
            let mut session: Session = serde_json::from_value(body)?;
            session.stamp_expiry();
            self.store(Some(session.clone()));
            self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));
            Ok(SignUpOutcome {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            Ok(SignUpOutcome {
                user: Some(serde_json::from_value(body)?),
                session: None,
            })
        }
    }

    async fn update_user(&self, attributes: &UserAttributes) -> AuthResult<User> {
        let mut session = self.get_session().await?.ok_or(AuthError::NoSession)?;
        let url = format!("{}/user", self.auth_url);
        let user: User = self
            .call(
                self.http
                    .put(&url)
                    .bearer_auth(&session.access_token)
                    .json(attributes),
            )
            .await?;

        session.user = Some(user.clone());
        self.store(Some(session.clone()));
        self.emit(AuthChangeEvent::UserUpdated, Some(session));
        Ok(user)
    }
}

/// Deferred-initialization wrapper around [`SupabaseAuth`].
///
/// The provider is built from its configuration on first use. Missing URL or
/// key surfaces as [`AuthError::NotConfigured`] from that first call instead
/// of at construction time.
#[derive(Debug)]
pub struct LazySupabaseAuth {
    config: AuthConfig,
    events: broadcast::Sender<AuthChange>,
    inner: OnceCell<SupabaseAuth>,
}

impl LazySupabaseAuth {
    /// Wrap a configuration without touching it
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            events: broadcast::channel(EVENT_CAPACITY).0,
            inner: OnceCell::new(),
        }
    }

    /// The provider, built on first access
    pub fn get(&self) -> AuthResult<&SupabaseAuth> {
        self.inner.get_or_try_init(|| {
            let (url, key) = self
                .config
                .require()
                .map_err(|e: ApiError| AuthError::NotConfigured(e.to_string()))?;
            debug!(component = "Auth", "Initializing session provider");
            SupabaseAuth::with_sender(url, key, self.events.clone())
        })
    }

    /// Whether the provider has been built
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.get().is_some()
    }
}

#[async_trait]
impl SessionProvider for LazySupabaseAuth {
    async fn get_session(&self) -> AuthResult<Option<Session>> {
        self.get()?.get_session().await
    }

    async fn refresh_session(&self) -> AuthResult<Session> {
        self.get()?.refresh_session().await
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.get()?.sign_out().await
    }

    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Session> {
        self.get()?.sign_in_with_password(email, password).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        data: Option<Value>,
    ) -> AuthResult<SignUpOutcome> {
        self.get()?.sign_up(email, password, data).await
    }

    async fn update_user(&self, attributes: &UserAttributes) -> AuthResult<User> {
        self.get()?.update_user(attributes).await
    }
}
