//! Request descriptors and the HTTP transport seam
//!
//! [`WorkOrderClient`](crate::WorkOrderClient) never talks to `reqwest`
//! directly; it hands an [`ApiRequest`] to an [`HttpTransport`]. The default
//! transport is [`ReqwestTransport`].

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::Serialize;

pub use reqwest::Method;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Outgoing request descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the base URL, or an absolute URL
    pub path: String,
    /// Extra headers
    pub headers: Vec<(String, String)>,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Create a request with no headers, query or body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// PUT request
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// DELETE request
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a query parameter when present
    #[must_use]
    pub fn with_optional_query<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with_query(key, v),
            None => self,
        }
    }

    /// Set a header, replacing any header with the same name
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Serialize `body` as the JSON payload
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Look up a header value (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Path plus encoded query string, for logging
    #[must_use]
    pub fn display_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self.query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes a single request.
///
/// Non-2xx statuses are returned as `Ok`; only failures to complete the
/// exchange are errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and collect the full response
    async fn execute(&self, request: &ApiRequest) -> ApiResult<RawResponse>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
    config: ClientConfig,
}

impl ReqwestTransport {
    /// Build a client with the configured timeout and default headers
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| ApiError::config("user_agent is not a valid header value"))?;
        default_headers.insert(USER_AGENT, agent);

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self { inner, config })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> ApiResult<RawResponse> {
        let url = self.config.url_for(&request.path);
        let request_id = uuid::Uuid::new_v4().to_string();

        let mut builder = self
            .inner
            .request(request.method.clone(), &url)
            .header(X_REQUEST_ID, &request_id);

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::transport(format!("invalid header name '{name}'")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ApiError::transport(format!("invalid value for header '{name}'")))?;
            builder = builder.header(name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        tracing::trace!(request_id = %request_id, url = %url, status, "Response received");
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get("/api/v1/work-orders")
            .with_query("page", 2)
            .with_optional_query("status", Some("Open"))
            .with_optional_query::<&str>("priority", None)
            .with_header("Authorization", "Bearer a")
            .with_header("authorization", "Bearer b");

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.query.len(), 2);
        assert_eq!(request.header("AUTHORIZATION"), Some("Bearer b"));
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.display_path(), "/api/v1/work-orders?page=2&status=Open");
    }

    #[test]
    fn test_with_json() {
        let request = ApiRequest::post("/api/v1/locations")
            .with_json(&json!({"name": "Depot"}))
            .unwrap();
        assert_eq!(request.body, Some(json!({"name": "Depot"})));
    }

    #[test]
    fn test_raw_response_success() {
        assert!(RawResponse::new(204, Vec::new()).is_success());
        assert!(!RawResponse::new(401, "{}").is_success());
    }

    #[test]
    fn test_reqwest_transport_rejects_invalid_config() {
        let config = ClientConfig::default().with_base_url("not-a-url");
        assert!(ReqwestTransport::new(config).is_err());
    }
}
