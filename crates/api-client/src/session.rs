//! Session provider abstraction
//!
//! The client depends only on the success/failure contract of these
//! operations, so tests substitute a fake and the CLI uses
//! [`SupabaseAuth`](crate::supabase::SupabaseAuth).

use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Authenticated user as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Provider user id
    pub id: String,
    /// Primary email address
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number, when registered
    #[serde(default)]
    pub phone: Option<String>,
    /// Account creation time (RFC 3339)
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last profile update (RFC 3339)
    #[serde(default)]
    pub updated_at: Option<String>,
    /// When the email address was confirmed
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    /// Most recent sign-in
    #[serde(default)]
    pub last_sign_in_at: Option<String>,
    /// Free-form profile data
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Credential issued by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token sent to the API
    pub access_token: String,
    /// Token exchanged for a new session
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token scheme, normally `bearer`
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds at issue time
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// User the session belongs to
    #[serde(default)]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Whether the session is past `expires_at` at `now` (unix seconds)
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Whether the session is expired right now
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Access token usable as a bearer credential, if any
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        if self.access_token.is_empty() || self.is_expired() {
            None
        } else {
            Some(&self.access_token)
        }
    }

    /// Fill `expires_at` from `expires_in` when the provider omitted it
    pub(crate) fn stamp_expiry(&mut self) {
        if self.expires_at.is_none() {
            if let Some(secs) = self.expires_in {
                self.expires_at = Some(Utc::now().timestamp() + secs);
            }
        }
    }
}

/// What changed in the auth state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    /// Session restored when the listener attached
    InitialSession,
    /// A sign-in completed
    SignedIn,
    /// The session was discarded
    SignedOut,
    /// The access token was replaced
    TokenRefreshed,
    /// Profile attributes changed
    UserUpdated,
}

/// Notification broadcast on every auth state change
#[derive(Debug, Clone, PartialEq)]
pub struct AuthChange {
    /// What happened
    pub event: AuthChangeEvent,
    /// Session after the change
    pub session: Option<Session>,
}

/// Result of a sign-up; the session is absent until the email is confirmed
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    /// Created user, when the provider returns one
    pub user: Option<User>,
    /// Session, present once signed in
    pub session: Option<Session>,
}

/// Fields accepted by [`SessionProvider::update_user`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAttributes {
    /// New email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Replacement profile metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// External auth/session provider
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current session, if signed in
    async fn get_session(&self) -> AuthResult<Option<Session>>;

    /// Exchange the refresh token for a new session
    async fn refresh_session(&self) -> AuthResult<Session>;

    /// End the session
    async fn sign_out(&self) -> AuthResult<()>;

    /// Subscribe to auth state changes
    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthChange>;

    /// Password sign-in
    async fn sign_in_with_password(&self, _email: &str, _password: &str) -> AuthResult<Session> {
        Err(AuthError::Unsupported("sign_in_with_password"))
    }

    /// Register a new user
    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _data: Option<serde_json::Value>,
    ) -> AuthResult<SignUpOutcome> {
        Err(AuthError::Unsupported("sign_up"))
    }

    /// Update the signed-in user
    async fn update_user(&self, _attributes: &UserAttributes) -> AuthResult<User> {
        Err(AuthError::Unsupported("update_user"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(expires_at: Option<i64>) -> Session {
        Session {
            access_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            token_type: "bearer".to_string(),
            expires_in: Some(3600),
            expires_at,
            user: None,
        }
    }

    #[test]
    fn test_bearer_token_validity() {
        let far_future = Utc::now().timestamp() + 3600;
        assert_eq!(session(Some(far_future)).bearer_token(), Some("token"));
        assert_eq!(session(None).bearer_token(), Some("token"));
        assert_eq!(session(Some(1)).bearer_token(), None);

        let mut empty = session(None);
        empty.access_token.clear();
        assert_eq!(empty.bearer_token(), None);
    }

    #[test]
    fn test_stamp_expiry() {
        let mut s = session(None);
        s.stamp_expiry();
        let at = s.expires_at.unwrap();
        assert!(at > Utc::now().timestamp() + 3500);
    }

    #[test]
    fn test_session_deserialize_gotrue_shape() {
        let s: Session = serde_json::from_value(json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_900_000_000,
            "refresh_token": "r",
            "user": {"id": "u-1", "email": "a@example.com", "user_metadata": {}}
        }))
        .unwrap();

        assert_eq!(s.refresh_token.as_deref(), Some("r"));
        assert_eq!(s.user.unwrap().email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_user_attributes_skip_empty() {
        let attrs = UserAttributes {
            password: Some("new".to_string()),
            ..UserAttributes::default()
        };
        assert_eq!(serde_json::to_value(&attrs).unwrap(), json!({"password": "new"}));
    }

    struct Minimal;

    #[async_trait]
    impl SessionProvider for Minimal {
        async fn get_session(&self) -> AuthResult<Option<Session>> {
            Ok(None)
        }
        async fn refresh_session(&self) -> AuthResult<Session> {
            Err(AuthError::NoSession)
        }
        async fn sign_out(&self) -> AuthResult<()> {
            Ok(())
        }
        fn on_auth_state_change(&self) -> broadcast::Receiver<AuthChange> {
            broadcast::channel(1).1
        }
    }

    #[tokio::test]
    async fn test_default_methods_are_unsupported() {
        let provider = Minimal;
        assert!(matches!(
            provider.sign_in_with_password("a", "b").await,
            Err(AuthError::Unsupported("sign_in_with_password"))
        ));
        assert!(matches!(provider.sign_up("a", "b", None).await, Err(AuthError::Unsupported(_))));
        assert!(matches!(
            provider.update_user(&UserAttributes::default()).await,
            Err(AuthError::Unsupported(_))
        ));
    }
}
