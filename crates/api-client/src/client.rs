//! Authenticated API client
//!
//! Every request goes through [`WorkOrderClient::send`], which injects the
//! bearer token of the current session, logs the exchange and recovers from
//! a single authorization failure by refreshing the session.

use crate::config::ClientConfig;
use crate::endpoints::{AuthApi, HealthApi, LocationsApi, WorkOrdersApi};
use crate::error::{ApiError, ApiResult};
use crate::navigator::{LogNavigator, Navigator};
use crate::session::SessionProvider;
use crate::transport::{ApiRequest, HttpTransport, RawResponse, ReqwestTransport};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Work-order API client with session refresh-and-retry
///
/// All state lives behind `Arc`, so clones are cheap and share the
/// transport, the session provider and the navigator.
#[derive(Clone)]
pub struct WorkOrderClient {
    transport: Arc<dyn HttpTransport>,
    session: Arc<dyn SessionProvider>,
    navigator: Arc<dyn Navigator>,
    config: Arc<ClientConfig>,
}

impl std::fmt::Debug for WorkOrderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkOrderClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WorkOrderClient {
    /// Create a client from explicitly constructed collaborators
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: Arc<dyn SessionProvider>,
        navigator: Arc<dyn Navigator>,
        config: ClientConfig,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
            config: Arc::new(config),
        }
    }

    /// Create a client over `reqwest` that logs redirects instead of
    /// navigating
    pub fn with_config(config: ClientConfig, session: Arc<dyn SessionProvider>) -> ApiResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.clone())?);
        Ok(Self::new(transport, session, Arc::new(LogNavigator), config))
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The session provider used for token injection
    #[must_use]
    pub fn session_provider(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access work order endpoints
    #[must_use]
    pub fn work_orders(&self) -> WorkOrdersApi {
        WorkOrdersApi::new(self.clone())
    }

    /// Access location endpoints
    #[must_use]
    pub fn locations(&self) -> LocationsApi {
        LocationsApi::new(self.clone())
    }

    /// Access backend auth endpoints
    #[must_use]
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access health check endpoints
    #[must_use]
    pub fn health(&self) -> HealthApi {
        HealthApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // HTTP methods
    // -------------------------------------------------------------------------

    /// Perform a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(ApiRequest::get(path)).await
    }

    /// Perform a GET request with query parameters
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &[(&str, Q)]) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: ToString,
    {
        let request = query
            .iter()
            .fold(ApiRequest::get(path), |req, (key, value)| req.with_query(*key, value.to_string()));
        self.send(request).await
    }

    /// Perform a POST request with a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send(ApiRequest::post(path).with_json(body)?).await
    }

    /// Perform a PUT request with a JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send(ApiRequest::put(path).with_json(body)?).await
    }

    /// Perform a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Send a request and decode the JSON response body.
    ///
    /// A 401 triggers one session refresh. If the refresh succeeds the
    /// request is replayed once with the new token; a second 401 is
    /// returned as an error. If the refresh fails the user is signed out,
    /// redirected to the login path, and the original error is returned.
    /// Every other failure is returned unchanged.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let response = match self.dispatch(&request).await {
            Err(e) if e.is_unauthorized() => self.recover_unauthorized(&request, e).await?,
            other => other?,
        };
        decode(&response)
    }

    async fn recover_unauthorized(&self, request: &ApiRequest, original: ApiError) -> ApiResult<RawResponse> {
        warn!(component = "ApiClient", "Authentication token expired, attempting refresh");

        match self.session.refresh_session().await {
            Ok(_) => {
                info!(component = "ApiClient", "Token refreshed successfully, retrying request");
                self.dispatch(request).await
            }
            Err(refresh_error) => {
                error!(
                    component = "ApiClient",
                    error = %refresh_error,
                    "Token refresh failed, signing out user"
                );
                if let Err(e) = self.session.sign_out().await {
                    warn!(component = "ApiClient", error = %e, "Sign-out after failed refresh also failed");
                }
                self.navigator.redirect(&self.config.login_path);
                Err(original)
            }
        }
    }

    /// One exchange: token injection, transport, logging, status check
    async fn dispatch(&self, request: &ApiRequest) -> ApiResult<RawResponse> {
        let request = self.authorize(request).await;
        let method = request.method.as_str().to_string();
        let url = request.display_path();

        debug!(component = "ApiClient", method = %method, url = %url, "API Request: {} {}", method, url);

        let start = Instant::now();
        let result = self.transport.execute(&request).await;
        let elapsed = start.elapsed();

        match result {
            Ok(response) => {
                workorder_telemetry::log_api_request(&method, &url, Some(elapsed), Some(response.status));
                if response.is_success() {
                    Ok(response)
                } else {
                    Err(ApiError::from_response(response.status, &response.body))
                }
            }
            Err(e) => {
                workorder_telemetry::log_api_request(&method, &url, Some(elapsed), e.status());
                error!(component = "ApiClient", error = %e, "API {} {} failed", method, url);
                Err(e)
            }
        }
    }

    /// Copy of `request` carrying the current bearer token, if any
    async fn authorize(&self, request: &ApiRequest) -> ApiRequest {
        let token = match self.session.get_session().await {
            Ok(session) => session.and_then(|s| s.bearer_token().map(str::to_string)),
            Err(e) => {
                warn!(component = "ApiClient", error = %e, "Could not read session, sending unauthenticated");
                None
            }
        };

        match token {
            Some(token) => request
                .clone()
                .with_header(AUTHORIZATION.as_str(), format!("Bearer {token}")),
            None => request.clone(),
        }
    }
}

/// Decode a success body; an empty body decodes as JSON `null`
fn decode<T: DeserializeOwned>(response: &RawResponse) -> ApiResult<T> {
    let body: &[u8] = if response.body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &response.body
    };
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, AuthResult};
    use crate::session::{AuthChange, Session};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::broadcast;
    use tokio_test::{assert_err, assert_ok};

    /// Replays scripted responses and records every request it sees
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<ApiResult<RawResponse>>>,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<ApiResult<RawResponse>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::default(),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn auth_headers(&self) -> Vec<Option<String>> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.header("Authorization").map(str::to_string))
                .collect()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn execute(&self, request: &ApiRequest) -> ApiResult<RawResponse> {
            self.seen.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::transport("no scripted response left")))
        }
    }

    /// Session provider whose token changes on refresh
    struct FakeSession {
        token: Mutex<Option<String>>,
        refresh_ok: bool,
        session_error: bool,
        refreshes: AtomicUsize,
        sign_outs: AtomicUsize,
        events: broadcast::Sender<AuthChange>,
    }

    impl FakeSession {
        fn new(token: Option<&str>, refresh_ok: bool) -> Arc<Self> {
            Arc::new(Self::build(token, refresh_ok, false))
        }

        fn broken() -> Arc<Self> {
            Arc::new(Self::build(Some("unused"), false, true))
        }

        fn build(token: Option<&str>, refresh_ok: bool, session_error: bool) -> Self {
            Self {
                token: Mutex::new(token.map(str::to_string)),
                refresh_ok,
                session_error,
                refreshes: AtomicUsize::new(0),
                sign_outs: AtomicUsize::new(0),
                events: broadcast::channel(4).0,
            }
        }

        fn session(token: &str) -> Session {
            Session {
                access_token: token.to_string(),
                refresh_token: Some("refresh".to_string()),
                token_type: "bearer".to_string(),
                expires_in: None,
                expires_at: None,
                user: None,
            }
        }
    }

    #[async_trait]
    impl SessionProvider for FakeSession {
        async fn get_session(&self) -> AuthResult<Option<Session>> {
            if self.session_error {
                return Err(AuthError::provider(500, "storage unavailable"));
            }
            Ok(self.token.lock().unwrap().as_deref().map(Self::session))
        }

        async fn refresh_session(&self) -> AuthResult<Session> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            if self.refresh_ok {
                *self.token.lock().unwrap() = Some("fresh".to_string());
                Ok(Self::session("fresh"))
            } else {
                Err(AuthError::provider(400, "Invalid Refresh Token"))
            }
        }

        async fn sign_out(&self) -> AuthResult<()> {
            self.sign_outs.fetch_add(1, Ordering::SeqCst);
            *self.token.lock().unwrap() = None;
            Err(AuthError::provider(500, "logout endpoint down"))
        }

        fn on_auth_state_change(&self) -> broadcast::Receiver<AuthChange> {
            self.events.subscribe()
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        redirects: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn redirect(&self, destination: &str) {
            self.redirects.lock().unwrap().push(destination.to_string());
        }
    }

    fn ok(body: Value) -> ApiResult<RawResponse> {
        Ok(RawResponse::new(200, body.to_string()))
    }

    fn status(code: u16, body: Value) -> ApiResult<RawResponse> {
        Ok(RawResponse::new(code, body.to_string()))
    }

    fn client(
        transport: &Arc<ScriptedTransport>,
        session: &Arc<FakeSession>,
        navigator: &Arc<RecordingNavigator>,
    ) -> WorkOrderClient {
        WorkOrderClient::new(
            transport.clone(),
            session.clone(),
            navigator.clone(),
            ClientConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_injects_bearer_token() {
        let transport = ScriptedTransport::new(vec![ok(json!({"status": "healthy"}))]);
        let session = FakeSession::new(Some("abc"), true);
        let navigator = Arc::new(RecordingNavigator::default());

        let body: Value = assert_ok!(client(&transport, &session, &navigator).get("/health").await);

        assert_eq!(body["status"], "healthy");
        assert_eq!(transport.auth_headers(), vec![Some("Bearer abc".to_string())]);
    }

    #[tokio::test]
    async fn test_no_session_sends_without_token() {
        let transport = ScriptedTransport::new(vec![ok(json!([]))]);
        let session = FakeSession::new(None, true);
        let navigator = Arc::new(RecordingNavigator::default());

        let _: Vec<Value> = assert_ok!(client(&transport, &session, &navigator).get("/api/v1/locations").await);
        assert_eq!(transport.auth_headers(), vec![None]);
    }

    #[tokio::test]
    async fn test_session_error_sends_unauthenticated() {
        let transport = ScriptedTransport::new(vec![ok(json!({}))]);
        let session = FakeSession::broken();
        let navigator = Arc::new(RecordingNavigator::default());

        let _: Value = assert_ok!(client(&transport, &session, &navigator).get("/").await);
        assert_eq!(transport.auth_headers(), vec![None]);
    }

    #[tokio::test]
    async fn test_401_then_refresh_replays_once() {
        let transport = ScriptedTransport::new(vec![
            status(401, json!({"detail": "Token expired"})),
            ok(json!({"id": "wo-1"})),
        ]);
        let session = FakeSession::new(Some("stale"), true);
        let navigator = Arc::new(RecordingNavigator::default());

        let body: Value = assert_ok!(client(&transport, &session, &navigator).get("/api/v1/work-orders/wo-1").await);

        assert_eq!(body, json!({"id": "wo-1"}));
        assert_eq!(transport.calls(), 2);
        assert_eq!(session.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(
            transport.auth_headers(),
            vec![Some("Bearer stale".to_string()), Some("Bearer fresh".to_string())]
        );
        assert!(navigator.redirects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_401_then_failed_refresh_signs_out() {
        let transport = ScriptedTransport::new(vec![status(401, json!({"detail": "Token expired"}))]);
        let session = FakeSession::new(Some("stale"), false);
        let navigator = Arc::new(RecordingNavigator::default());

        let err = assert_err!(
            client(&transport, &session, &navigator)
                .get::<Value>("/api/v1/work-orders")
                .await
        );

        assert!(err.is_unauthorized());
        assert_eq!(err.user_message("fallback"), "Token expired");
        assert_eq!(transport.calls(), 1);
        assert_eq!(session.sign_outs.load(Ordering::SeqCst), 1);
        assert_eq!(*navigator.redirects.lock().unwrap(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_second_401_is_not_retried() {
        let transport = ScriptedTransport::new(vec![
            status(401, json!({})),
            status(401, json!({"detail": "Still unauthorized"})),
            ok(json!({})),
        ]);
        let session = FakeSession::new(Some("stale"), true);
        let navigator = Arc::new(RecordingNavigator::default());

        let err = assert_err!(client(&transport, &session, &navigator).get::<Value>("/x").await);

        assert!(err.is_unauthorized());
        assert_eq!(err.user_message("fallback"), "Still unauthorized");
        assert_eq!(transport.calls(), 2);
        assert_eq!(session.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(session.sign_outs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let transport = ScriptedTransport::new(vec![
            status(422, json!({"detail": [{"msg": "field required"}]})),
            Err(ApiError::transport("connection refused")),
        ]);
        let session = FakeSession::new(Some("abc"), true);
        let navigator = Arc::new(RecordingNavigator::default());
        let client = client(&transport, &session, &navigator);

        let err = assert_err!(client.post::<Value, _>("/api/v1/work-orders", &json!({})).await);
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.user_message("Could not create"), "field required");

        let err = assert_err!(client.get::<Value>("/health").await);
        assert!(matches!(err, ApiError::Transport(_)));

        assert_eq!(transport.calls(), 2);
        assert_eq!(session.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_null() {
        let transport = ScriptedTransport::new(vec![Ok(RawResponse::new(204, Vec::new()))]);
        let session = FakeSession::new(Some("abc"), true);
        let navigator = Arc::new(RecordingNavigator::default());

        let result: Option<Value> = assert_ok!(client(&transport, &session, &navigator).delete("/api/v1/work-orders/1").await);
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_query_parameters_are_forwarded() {
        let transport = ScriptedTransport::new(vec![ok(json!([]))]);
        let session = FakeSession::new(None, true);
        let navigator = Arc::new(RecordingNavigator::default());

        let _: Value = assert_ok!(
            client(&transport, &session, &navigator)
                .get_with_query("/api/v1/work-orders", &[("page", 2), ("limit", 5)])
                .await
        );

        let seen = transport.seen.lock().unwrap();
        assert_eq!(
            seen[0].query,
            vec![("page".to_string(), "2".to_string()), ("limit".to_string(), "5".to_string())]
        );
    }
}
