//! Signed-in user state
//!
//! [`AuthStore`] mirrors the session provider's current user into an
//! observable [`AuthState`]. After [`AuthStore::initialize`] a background
//! task follows the provider's auth events until the returned
//! [`AuthSubscription`] is dropped.

use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use workorder_api_client::session::{SignUpOutcome, UserAttributes};
use workorder_api_client::{AuthResult, Session, SessionProvider, User};

/// Snapshot of the auth state
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    /// Signed-in user
    pub user: Option<User>,
    /// An auth operation is in flight
    pub loading: bool,
    /// `initialize` has completed
    pub initialized: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
            initialized: false,
        }
    }
}

impl AuthState {
    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Stops the auth event listener when dropped
#[derive(Debug)]
pub struct AuthSubscription {
    listener: JoinHandle<()>,
}

impl AuthSubscription {
    /// Stop following auth events
    pub fn unsubscribe(self) {
        self.listener.abort();
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Observable auth state backed by a [`SessionProvider`]
#[derive(Clone)]
pub struct AuthStore {
    provider: Arc<dyn SessionProvider>,
    state: Arc<watch::Sender<AuthState>>,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore").field("state", &*self.state.borrow()).finish_non_exhaustive()
    }
}

impl AuthStore {
    /// Store backed by `provider`, loading until initialized
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            provider,
            state: Arc::new(state),
        }
    }

    /// Current snapshot
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Signed-in user, if any
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// An auth operation is in flight
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// `initialize` has completed
    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Load the current session and start following auth events.
    ///
    /// Returns `None` when already initialized or when the session could not
    /// be read; the store is marked initialized either way.
    pub async fn initialize(&self) -> Option<AuthSubscription> {
        if self.is_initialized() {
            return None;
        }
        self.set_loading(true);

        let subscription = match self.provider.get_session().await {
            Ok(session) => {
                let events = self.provider.on_auth_state_change();
                let listener = tokio::spawn(follow_auth_events(events, Arc::clone(&self.state)));
                self.state.send_modify(|state| {
                    state.user = session.and_then(|s| s.user);
                    state.initialized = true;
                });
                Some(AuthSubscription { listener })
            }
            Err(e) => {
                error!(component = "Auth", error = %e, "Failed to initialize auth");
                self.state.send_modify(|state| {
                    state.user = None;
                    state.initialized = true;
                });
                None
            }
        };

        self.set_loading(false);
        subscription
    }

    /// Password sign-in
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        self.set_loading(true);
        let result = self.provider.sign_in_with_password(email, password).await;
        self.finish(&result, |state, session| state.user = session.user.clone());
        if result.is_ok() {
            info!(component = "Auth", "Signed in");
        }
        result
    }

    /// Register; the user is set even when confirmation is pending
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Option<serde_json::Value>,
    ) -> AuthResult<SignUpOutcome> {
        self.set_loading(true);
        let result = self.provider.sign_up(email, password, metadata).await;
        self.finish(&result, |state, outcome| state.user = outcome.user.clone());
        result
    }

    /// Sign out and clear the user
    pub async fn sign_out(&self) -> AuthResult<()> {
        self.set_loading(true);
        let result = self.provider.sign_out().await;
        self.finish(&result, |state, _| state.user = None);
        result
    }

    /// Update profile attributes and store the returned user
    pub async fn update_user(&self, attributes: &UserAttributes) -> AuthResult<User> {
        self.set_loading(true);
        let result = self.provider.update_user(attributes).await;
        self.finish(&result, |state, user| state.user = Some(user.clone()));
        result
    }

    fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }

    /// Clear `loading` and apply `on_success` in one change
    fn finish<T, E>(&self, result: &Result<T, E>, on_success: impl FnOnce(&mut AuthState, &T)) {
        self.state.send_modify(|state| {
            if let Ok(value) = result {
                on_success(state, value);
            }
            state.loading = false;
        });
    }
}

async fn follow_auth_events(
    mut events: broadcast::Receiver<workorder_api_client::AuthChange>,
    state: Arc<watch::Sender<AuthState>>,
) {
    loop {
        match events.recv().await {
            Ok(change) => {
                debug!(component = "Auth", event = ?change.event, "Auth state changed");
                let user = change.session.and_then(|s| s.user);
                state.send_modify(|state| state.user = user);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(component = "Auth", skipped, "Auth listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use workorder_api_client::{AuthChange, AuthChangeEvent, AuthError};

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            phone: None,
            created_at: None,
            updated_at: None,
            email_confirmed_at: None,
            last_sign_in_at: None,
            user_metadata: serde_json::Value::Null,
        }
    }

    fn session(id: &str) -> Session {
        Session {
            access_token: format!("token-{id}"),
            refresh_token: None,
            token_type: "bearer".to_string(),
            expires_in: None,
            expires_at: None,
            user: Some(user(id)),
        }
    }

    struct FakeProvider {
        current: Mutex<Option<Session>>,
        fail_session: bool,
        fail_sign_in: bool,
        events: broadcast::Sender<AuthChange>,
    }

    impl FakeProvider {
        fn new(current: Option<Session>) -> Arc<Self> {
            Arc::new(Self {
                current: Mutex::new(current),
                fail_session: false,
                fail_sign_in: false,
                events: broadcast::channel(16).0,
            })
        }

        fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
            let _ = self.events.send(AuthChange { event, session });
        }
    }

    #[async_trait]
    impl SessionProvider for FakeProvider {
        async fn get_session(&self) -> AuthResult<Option<Session>> {
            if self.fail_session {
                return Err(AuthError::provider(500, "boom"));
            }
            Ok(self.current.lock().unwrap().clone())
        }

        async fn refresh_session(&self) -> AuthResult<Session> {
            Err(AuthError::NoSession)
        }

        async fn sign_out(&self) -> AuthResult<()> {
            *self.current.lock().unwrap() = None;
            Ok(())
        }

        fn on_auth_state_change(&self) -> broadcast::Receiver<AuthChange> {
            self.events.subscribe()
        }

        async fn sign_in_with_password(&self, email: &str, _password: &str) -> AuthResult<Session> {
            if self.fail_sign_in {
                return Err(AuthError::provider(400, "Invalid login credentials"));
            }
            let id = email.split('@').next().unwrap_or_default();
            let session = session(id);
            *self.current.lock().unwrap() = Some(session.clone());
            Ok(session)
        }

        async fn update_user(&self, attributes: &UserAttributes) -> AuthResult<User> {
            let mut updated = user("u1");
            updated.email.clone_from(&attributes.email);
            Ok(updated)
        }
    }

    async fn wait_for(rx: &mut watch::Receiver<AuthState>, predicate: impl Fn(&AuthState) -> bool) {
        rx.wait_for(|state| predicate(state)).await.unwrap();
    }

    #[tokio::test]
    async fn test_initial_state() {
        let store = AuthStore::new(FakeProvider::new(None));
        assert!(store.is_loading());
        assert!(!store.is_initialized());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_initialize_reads_session() {
        let store = AuthStore::new(FakeProvider::new(Some(session("u1"))));

        let subscription = store.initialize().await;

        assert!(subscription.is_some());
        assert!(store.is_initialized());
        assert!(!store.is_loading());
        assert_eq!(store.user().unwrap().id, "u1");
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let store = AuthStore::new(FakeProvider::new(None));
        let _first = store.initialize().await;
        assert!(store.initialize().await.is_none());
    }

    #[tokio::test]
    async fn test_initialize_error_marks_initialized() {
        let provider = Arc::new(FakeProvider {
            current: Mutex::new(Some(session("u1"))),
            fail_session: true,
            fail_sign_in: false,
            events: broadcast::channel(4).0,
        });
        let store = AuthStore::new(provider);

        assert!(store.initialize().await.is_none());
        assert!(store.is_initialized());
        assert!(!store.is_loading());
        assert!(store.user().is_none());
    }

    #[tokio::test]
    async fn test_follows_auth_events() {
        let provider = FakeProvider::new(None);
        let store = AuthStore::new(provider.clone());
        let _subscription = store.initialize().await;
        let mut rx = store.subscribe();

        provider.emit(AuthChangeEvent::SignedIn, Some(session("u2")));
        wait_for(&mut rx, AuthState::is_authenticated).await;
        assert_eq!(store.user().unwrap().id, "u2");

        provider.emit(AuthChangeEvent::SignedOut, None);
        wait_for(&mut rx, |state| !state.is_authenticated()).await;
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_listener() {
        let provider = FakeProvider::new(None);
        let store = AuthStore::new(provider.clone());
        let subscription = store.initialize().await.unwrap();

        subscription.unsubscribe();
        tokio::task::yield_now().await;
        provider.emit(AuthChangeEvent::SignedIn, Some(session("u3")));
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        assert!(store.user().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let store = AuthStore::new(FakeProvider::new(None));

        let session = store.sign_in("ada@example.com", "secret").await.unwrap();
        assert_eq!(session.access_token, "token-ada");
        assert_eq!(store.user().unwrap().id, "ada");
        assert!(!store.is_loading());

        store.sign_out().await.unwrap();
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_state() {
        let provider = Arc::new(FakeProvider {
            current: Mutex::new(None),
            fail_session: false,
            fail_sign_in: true,
            events: broadcast::channel(4).0,
        });
        let store = AuthStore::new(provider);

        let err = store.sign_in("ada@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), AuthError::provider(400, "Invalid login credentials").to_string());
        assert!(store.user().is_none());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_update_user() {
        let store = AuthStore::new(FakeProvider::new(None));
        let attributes = UserAttributes {
            email: Some("new@example.com".to_string()),
            ..UserAttributes::default()
        };

        store.update_user(&attributes).await.unwrap();
        assert_eq!(store.user().unwrap().email.as_deref(), Some("new@example.com"));
    }

    #[tokio::test]
    async fn test_sign_up_unsupported_is_reported() {
        let store = AuthStore::new(FakeProvider::new(None));
        let err = store.sign_up("a@example.com", "pw", None).await.unwrap_err();
        assert!(matches!(err, AuthError::Unsupported("sign_up")));
        assert!(!store.is_loading());
    }
}
