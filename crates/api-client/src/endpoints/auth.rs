//! Backend auth endpoints
//!
//! These proxy the session provider through the REST API. Interactive
//! sign-in normally goes through a [`SessionProvider`](crate::SessionProvider)
//! instead; these are used by tooling that only talks to the backend.

use crate::client::WorkOrderClient;
use crate::error::ApiResult;
use crate::models::{AuthResponse, MessageResponse, TokenRefresh, UserSignIn, UserSignUp};

/// Auth API interface
#[derive(Clone)]
pub struct AuthApi {
    client: WorkOrderClient,
}

impl AuthApi {
    pub(crate) fn new(client: WorkOrderClient) -> Self {
        Self { client }
    }

    /// POST /api/v1/auth/signup
    pub async fn sign_up(&self, credentials: &UserSignUp) -> ApiResult<AuthResponse> {
        self.client.post("/api/v1/auth/signup", credentials).await
    }

    /// POST /api/v1/auth/signin
    pub async fn sign_in(&self, credentials: &UserSignIn) -> ApiResult<AuthResponse> {
        self.client.post("/api/v1/auth/signin", credentials).await
    }

    /// POST /api/v1/auth/signout
    pub async fn sign_out(&self) -> ApiResult<MessageResponse> {
        self.client.post("/api/v1/auth/signout", &serde_json::json!({})).await
    }

    /// POST /api/v1/auth/refresh
    pub async fn refresh(&self, refresh_token: &str) -> ApiResult<AuthResponse> {
        let body = TokenRefresh {
            refresh_token: refresh_token.to_string(),
        };
        self.client.post("/api/v1/auth/refresh", &body).await
    }

    /// GET /api/v1/auth/me
    ///
    /// The backend returns the raw provider user, so the shape is left open.
    pub async fn me(&self) -> ApiResult<serde_json::Value> {
        self.client.get("/api/v1/auth/me").await
    }
}
