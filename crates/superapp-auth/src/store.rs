//! Auth state container.
//!
//! [`AuthStore`] owns the current user, tokens and loading/error flags and is
//! the only place they change. Actions call the API client, then publish the
//! new state to subscribers synchronously.
//!
//! # Concurrency
//!
//! Actions take `&self` and may overlap. Nothing is coalesced: two concurrent
//! logins both hit the service and the one that finishes last wins. Locks are
//! never held across an `.await`.
//!
//! # Persistence
//!
//! `stored_tokens`/`stored_user` mirror `tokens`/`user`; whenever they change
//! the record is written through to the [`SecureStorage`]. Writes happen in
//! the same order as the state changes that caused them. Storage failures
//! are logged and never fail an action.

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock, Weak};

use crate::api::{AuthApiClient, LoginCredentials, RegisterData, UpdateProfileData};
use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::storage::{SecureStorage, StoredAuth};
use crate::token::mask_token;
use crate::types::{TokenPair, User};

static GLOBAL_STORE: OnceLock<Arc<AuthStore>> = OnceLock::new();

/// Snapshot of the auth state.
///
/// Invariant: `is_authenticated` implies `tokens.is_some()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub tokens: Option<TokenPair>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Copy of `tokens` as last written to secure storage
    pub stored_tokens: Option<TokenPair>,
    /// Copy of `user` as last written to secure storage
    pub stored_user: Option<User>,
}

impl AuthState {
    pub fn phase(&self) -> AuthPhase {
        if self.is_loading {
            AuthPhase::Authenticating
        } else if self.error.is_some() {
            AuthPhase::Errored
        } else if self.is_authenticated {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Anonymous
        }
    }

    fn reset_session(&mut self) {
        self.user = None;
        self.tokens = None;
        self.is_authenticated = false;
        self.error = None;
        self.stored_tokens = None;
        self.stored_user = None;
    }

    fn stored(&self) -> StoredAuth {
        StoredAuth {
            tokens: self.stored_tokens.clone(),
            user: self.stored_user.clone(),
        }
    }
}

/// Coarse state derived from `{is_authenticated, is_loading, error}`.
///
/// `Errored` can hold for an authenticated or an anonymous session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    Errored,
}

impl fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthPhase::Anonymous => write!(f, "anonymous"),
            AuthPhase::Authenticating => write!(f, "authenticating"),
            AuthPhase::Authenticated => write!(f, "authenticated"),
            AuthPhase::Errored => write!(f, "errored"),
        }
    }
}

/// Outcome of a refresh request, before any state is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshError {
    /// No refresh token in the store
    NoRefreshToken,
    /// The service call failed
    RefreshFailed(AuthError),
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshError::NoRefreshToken => write!(f, "{}", AuthError::NoRefreshToken),
            RefreshError::RefreshFailed(e) => write!(f, "Token refresh failed: {e}"),
        }
    }
}

impl std::error::Error for RefreshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RefreshError::NoRefreshToken => None,
            RefreshError::RefreshFailed(e) => Some(e),
        }
    }
}

impl From<RefreshError> for AuthError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::NoRefreshToken => AuthError::NoRefreshToken,
            RefreshError::RefreshFailed(e) => e,
        }
    }
}

type Listener = Arc<dyn Fn(&AuthState) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Handle returned by [`AuthStore::subscribe`].
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Stops further notifications to this listener.
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            let mut guard = listeners.lock().unwrap_or_else(PoisonError::into_inner);
            guard.entries.retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Owned auth context: API client, secure storage, and the current state.
pub struct AuthStore {
    api: AuthApiClient,
    storage: Arc<dyn SecureStorage>,
    state: RwLock<AuthState>,
    /// Held from mutation through the storage write so storage sees
    /// mutations in state order.
    persist_lock: Mutex<()>,
    listeners: Arc<Mutex<Listeners>>,
}

impl AuthStore {
    pub fn new(api: AuthApiClient, storage: Arc<dyn SecureStorage>) -> Self {
        Self {
            api,
            storage,
            state: RwLock::new(AuthState::default()),
            persist_lock: Mutex::new(()),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Builds a store with a fresh API client for `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &AuthConfig, storage: Arc<dyn SecureStorage>) -> Result<Self> {
        Ok(Self::new(AuthApiClient::new(config)?, storage))
    }

    /// Installs the process-wide default store.
    ///
    /// # Errors
    /// Returns the store back if one was already installed.
    pub fn install_global(store: Arc<AuthStore>) -> std::result::Result<(), Arc<AuthStore>> {
        GLOBAL_STORE.set(store)
    }

    /// The process-wide default store, if [`AuthStore::install_global`] ran.
    pub fn global() -> Option<Arc<AuthStore>> {
        GLOBAL_STORE.get().cloned()
    }

    pub fn api(&self) -> &AuthApiClient {
        &self.api
    }

    /// Cloned snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn phase(&self) -> AuthPhase {
        self.read(AuthState::phase)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|s| s.is_authenticated)
    }

    pub fn user(&self) -> Option<User> {
        self.read(|s| s.user.clone())
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.read(|s| s.tokens.clone())
    }

    /// Registers `listener`, called synchronously with the new state after
    /// every mutation.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let mut guard = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = guard.next_id;
        guard.next_id += 1;
        guard.entries.push((id, listener));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    // === Actions ===

    /// Logs in and installs the returned session.
    ///
    /// # Errors
    /// Returns the API error after recording its message in `error`.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<()> {
        self.begin();
        match self.api.login(credentials).await {
            Ok(response) => {
                tracing::info!(user_id = %response.user.id, "logged in");
                self.install_session(response.user, response.tokens);
                Ok(())
            }
            Err(err) => Err(self.fail(err, "Login failed")),
        }
    }

    /// Registers an account and installs the returned session.
    ///
    /// # Errors
    /// Returns the API error after recording its message in `error`.
    pub async fn register(&self, data: &RegisterData) -> Result<()> {
        self.begin();
        match self.api.register(data).await {
            Ok(response) => {
                tracing::info!(user_id = %response.user.id, "registered");
                self.install_session(response.user, response.tokens);
                Ok(())
            }
            Err(err) => Err(self.fail(err, "Registration failed")),
        }
    }

    /// Ends the session. The local state is always cleared; a failed remote
    /// logout is only logged.
    pub async fn logout(&self) {
        self.begin();
        if let Err(err) = self.api.logout().await {
            tracing::warn!(error = %err, kind = %err.kind(), "logout request failed; clearing local session");
        }
        self.api.set_auth_token(None);
        self.update(|s| {
            s.reset_session();
            s.is_loading = false;
        });
    }

    /// Asks the service for a new token pair without touching state.
    ///
    /// # Errors
    /// [`RefreshError::NoRefreshToken`] when nothing is stored,
    /// [`RefreshError::RefreshFailed`] when the call fails.
    pub async fn request_refresh(&self) -> std::result::Result<TokenPair, RefreshError> {
        let refresh_token = self
            .read(|s| s.tokens.as_ref().map(|t| t.refresh_token.clone()))
            .filter(|t| !t.is_empty())
            .ok_or(RefreshError::NoRefreshToken)?;

        self.api
            .refresh_token(&refresh_token)
            .await
            .map_err(RefreshError::RefreshFailed)
    }

    /// Refreshes the token pair. A failed refresh forces a full
    /// [`clear_auth`](Self::clear_auth); a missing refresh token leaves state
    /// unchanged.
    ///
    /// # Errors
    /// [`AuthError::NoRefreshToken`] or the API error.
    pub async fn refresh_token(&self) -> Result<TokenPair> {
        match self.request_refresh().await {
            Ok(tokens) => {
                tracing::debug!(access_token = %mask_token(&tokens.access_token), "token refreshed");
                self.api.set_auth_token(Some(&tokens.access_token));
                self.update(|s| {
                    s.tokens = Some(tokens.clone());
                    s.stored_tokens = Some(tokens.clone());
                });
                Ok(tokens)
            }
            Err(RefreshError::NoRefreshToken) => Err(AuthError::NoRefreshToken),
            Err(RefreshError::RefreshFailed(err)) => {
                tracing::warn!(error = %err, "token refresh failed; clearing session");
                self.clear_auth();
                Err(err)
            }
        }
    }

    /// Sends a profile update and replaces the user with the response.
    ///
    /// # Errors
    /// Returns the API error after recording its message in `error`.
    pub async fn update_profile(&self, data: &UpdateProfileData) -> Result<User> {
        self.begin();
        match self.api.update_profile(data).await {
            Ok(user) => {
                self.update(|s| {
                    s.user = Some(user.clone());
                    s.stored_user = Some(user.clone());
                    s.is_loading = false;
                    s.error = None;
                });
                Ok(user)
            }
            Err(err) => Err(self.fail(err, "Profile update failed")),
        }
    }

    /// Re-reads the user from `GET /auth/me`.
    ///
    /// # Errors
    /// Returns the API error after recording its message in `error`.
    pub async fn fetch_current_user(&self) -> Result<User> {
        self.begin();
        match self.api.get_current_user().await {
            Ok(user) => {
                self.update(|s| {
                    s.user = Some(user.clone());
                    s.stored_user = Some(user.clone());
                    s.is_loading = false;
                });
                Ok(user)
            }
            Err(err) => Err(self.fail(err, "Failed to load user")),
        }
    }

    /// Replaces the user locally (no network call).
    pub fn update_user(&self, user: User) {
        self.update(|s| {
            s.stored_user = Some(user.clone());
            s.user = Some(user);
        });
    }

    /// Installs a token pair without validation and marks the session
    /// authenticated. The bearer header follows the new access token.
    pub fn set_tokens(&self, tokens: TokenPair) {
        self.api.set_auth_token(Some(&tokens.access_token));
        self.update(|s| {
            s.stored_tokens = Some(tokens.clone());
            s.tokens = Some(tokens);
            s.is_authenticated = true;
        });
    }

    pub fn set_error(&self, error: Option<String>) {
        self.update(|s| s.error = error);
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(|s| s.is_loading = loading);
    }

    /// Drops the session locally: bearer header, user, tokens, error.
    pub fn clear_auth(&self) {
        self.api.set_auth_token(None);
        self.update(AuthState::reset_session);
    }

    /// Loads the last persisted session, if any. Returns whether tokens were
    /// restored.
    pub fn restore(&self) -> bool {
        let stored = match self.storage.load() {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load stored session");
                return false;
            }
        };

        let restored = stored.tokens.is_some();
        if let Some(tokens) = &stored.tokens {
            self.api.set_auth_token(Some(&tokens.access_token));
        }
        let (_, snapshot) = self.mutate(|s| {
            s.is_authenticated = stored.tokens.is_some();
            s.tokens.clone_from(&stored.tokens);
            s.user.clone_from(&stored.user);
            s.stored_tokens = stored.tokens;
            s.stored_user = stored.user;
        });
        self.notify(&snapshot);
        tracing::debug!(restored, "restored stored session");
        restored
    }

    // === Plumbing ===

    fn read<T>(&self, f: impl FnOnce(&AuthState) -> T) -> T {
        f(&*self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn begin(&self) {
        self.update(|s| {
            s.is_loading = true;
            s.error = None;
        });
    }

    fn fail(&self, err: AuthError, fallback: &str) -> AuthError {
        let message = err.to_string();
        let message = if message.is_empty() {
            fallback.to_string()
        } else {
            message
        };
        tracing::debug!(error = %message, kind = %err.kind(), "auth action failed");
        self.update(|s| {
            s.error = Some(message);
            s.is_loading = false;
        });
        err
    }

    fn install_session(&self, user: User, tokens: TokenPair) {
        self.api.set_auth_token(Some(&tokens.access_token));
        self.update(|s| {
            s.stored_user = Some(user.clone());
            s.stored_tokens = Some(tokens.clone());
            s.user = Some(user);
            s.tokens = Some(tokens);
            s.is_authenticated = true;
            s.is_loading = false;
            s.error = None;
        });
    }

    /// Applies `f`, mirrors changed stored fields to storage, notifies.
    fn update(&self, f: impl FnOnce(&mut AuthState)) {
        let snapshot = {
            let _persisting = self.persist_lock.lock().unwrap_or_else(PoisonError::into_inner);
            let (before, snapshot) = self.mutate(f);
            let after = snapshot.stored();
            if before != after {
                self.persist(&after);
            }
            snapshot
        };
        self.notify(&snapshot);
    }

    /// Applies `f` under the write lock. Returns the stored record from
    /// before the change and the new state.
    fn mutate(&self, f: impl FnOnce(&mut AuthState)) -> (StoredAuth, AuthState) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let before = guard.stored();
        f(&mut *guard);
        (before, guard.clone())
    }

    fn persist(&self, stored: &StoredAuth) {
        let result = if stored.is_empty() {
            self.storage.clear().map(drop)
        } else {
            self.storage.save(stored)
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to persist auth state");
        }
    }

    fn notify(&self, snapshot: &AuthState) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

impl fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthStore")
            .field("api", &self.api)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::storage::MemoryStorage;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: "a@b.com".to_string(),
            name: "Ana".to_string(),
            avatar: None,
            role: None,
            email_verified: true,
            created_at: "c".to_string(),
            updated_at: "u".to_string(),
        }
    }

    // Port 9 (discard) is never contacted by these tests.
    fn store_with(storage: Arc<MemoryStorage>) -> AuthStore {
        AuthStore::from_config(&AuthConfig::with_base_url("http://127.0.0.1:9"), storage).unwrap()
    }

    fn store() -> (AuthStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (store_with(Arc::clone(&storage)), storage)
    }

    /// Test: fresh store is anonymous with all defaults.
    #[test]
    fn test_initial_state() {
        let (store, _) = store();
        assert_eq!(store.state(), AuthState::default());
        assert_eq!(store.phase(), AuthPhase::Anonymous);
        assert_eq!(store.api().auth_token(), None);
    }

    /// Test: phase derivation.
    #[test]
    fn test_phase_derivation() {
        let mut state = AuthState::default();
        state.is_loading = true;
        assert_eq!(state.phase(), AuthPhase::Authenticating);

        state.is_authenticated = true;
        state.tokens = Some(TokenPair::new("T", "R"));
        assert_eq!(state.phase(), AuthPhase::Authenticating);

        state.is_loading = false;
        assert_eq!(state.phase(), AuthPhase::Authenticated);

        state.error = Some("boom".to_string());
        assert_eq!(state.phase(), AuthPhase::Errored);

        state.is_authenticated = false;
        assert_eq!(state.phase(), AuthPhase::Errored);
        assert_eq!(AuthPhase::Errored.to_string(), "errored");
    }

    /// Test: set_tokens authenticates, sets bearer, and persists.
    #[test]
    fn test_set_tokens() {
        let (store, storage) = store();
        store.set_tokens(TokenPair::new("T1", "R1"));

        let state = store.state();
        assert!(state.is_authenticated);
        assert_eq!(state.tokens, Some(TokenPair::new("T1", "R1")));
        assert_eq!(state.stored_tokens, state.tokens);
        assert_eq!(store.api().authorization_header().as_deref(), Some("Bearer T1"));
        assert_eq!(storage.snapshot().tokens, Some(TokenPair::new("T1", "R1")));
    }

    /// Test: update_user replaces the user and mirrors it.
    #[test]
    fn test_update_user() {
        let (store, storage) = store();
        store.update_user(user("u1"));
        store.update_user(user("u2"));
        assert_eq!(store.user().map(|u| u.id), Some("u2".to_string()));
        assert_eq!(storage.snapshot().user.map(|u| u.id), Some("u2".to_string()));
        assert!(!store.is_authenticated());
    }

    /// Test: clear_auth twice equals clear_auth once.
    #[test]
    fn test_clear_auth_idempotent() {
        let (store, storage) = store();
        store.set_tokens(TokenPair::new("T1", "R1"));
        store.update_user(user("u1"));
        store.set_error(Some("stale".to_string()));

        store.clear_auth();
        let once = store.state();
        store.clear_auth();
        let twice = store.state();

        assert_eq!(once, AuthState::default());
        assert_eq!(once, twice);
        assert_eq!(store.api().auth_token(), None);
        assert!(storage.snapshot().is_empty());
    }

    /// Test: clear_auth leaves the loading flag alone.
    #[test]
    fn test_clear_auth_keeps_loading() {
        let (store, _) = store();
        store.set_loading(true);
        store.clear_auth();
        assert!(store.state().is_loading);
    }

    /// Test: refresh without a refresh token leaves state unchanged.
    #[tokio::test]
    async fn test_refresh_without_token() {
        let (store, _) = store();
        store.update_user(user("u1"));
        let before = store.state();

        assert_eq!(store.refresh_token().await, Err(AuthError::NoRefreshToken));
        assert_eq!(
            store.request_refresh().await,
            Err(RefreshError::NoRefreshToken)
        );
        assert_eq!(store.state(), before);
    }

    /// Test: listeners see each mutation until unsubscribed.
    #[test]
    fn test_subscribe_and_unsubscribe() {
        let (store, _) = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sub = {
            let calls = Arc::clone(&calls);
            let seen = Arc::clone(&seen);
            store.subscribe(move |state| {
                calls.fetch_add(1, Ordering::SeqCst);
                seen.lock().unwrap().push(state.is_authenticated);
            })
        };

        store.set_tokens(TokenPair::new("T1", "R1"));
        store.clear_auth();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);

        sub.unsubscribe();
        store.set_tokens(TokenPair::new("T2", "R2"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// Test: a listener may read the store without deadlocking.
    #[test]
    fn test_listener_reads_store() {
        let (store, _) = store();
        let store = Arc::new(store);
        let observed = Arc::new(Mutex::new(None));
        let _sub = {
            let weak = Arc::downgrade(&store);
            let observed = Arc::clone(&observed);
            store.subscribe(move |_| {
                if let Some(store) = weak.upgrade() {
                    *observed.lock().unwrap() = Some(store.phase());
                }
            })
        };
        store.set_tokens(TokenPair::new("T1", "R1"));
        assert_eq!(*observed.lock().unwrap(), Some(AuthPhase::Authenticated));
    }

    /// Test: restore loads persisted tokens and user.
    #[test]
    fn test_restore() {
        let storage = Arc::new(MemoryStorage::with(StoredAuth {
            tokens: Some(TokenPair::new("T9", "R9")),
            user: Some(user("u9")),
        }));
        let store = store_with(storage);
        assert!(store.restore());

        let state = store.state();
        assert!(state.is_authenticated);
        assert_eq!(state.user.map(|u| u.id), Some("u9".to_string()));
        assert_eq!(state.stored_tokens, Some(TokenPair::new("T9", "R9")));
        assert_eq!(store.api().auth_token().as_deref(), Some("T9"));
    }

    #[test]
    fn test_restore_empty() {
        let (store, _) = store();
        assert!(!store.restore());
        assert_eq!(store.state(), AuthState::default());
    }

    /// Storage that stalls while saving the `T1` pair.
    struct SlowStorage {
        inner: MemoryStorage,
        entered: Mutex<Option<mpsc::Sender<()>>>,
    }

    impl SecureStorage for SlowStorage {
        fn load(&self) -> anyhow::Result<StoredAuth> {
            self.inner.load()
        }

        fn save(&self, stored: &StoredAuth) -> anyhow::Result<()> {
            let is_first = stored.tokens.as_ref().is_some_and(|t| t.access_token == "T1");
            if is_first {
                if let Some(entered) = self.entered.lock().unwrap().take() {
                    entered.send(()).unwrap();
                }
                thread::sleep(Duration::from_millis(200));
            }
            self.inner.save(stored)
        }

        fn clear(&self) -> anyhow::Result<bool> {
            self.inner.clear()
        }
    }

    /// Test: overlapping mutations reach storage in state order.
    #[test]
    fn test_persist_follows_state_order() {
        let (tx, rx) = mpsc::channel();
        let slow = Arc::new(SlowStorage {
            inner: MemoryStorage::new(),
            entered: Mutex::new(Some(tx)),
        });
        let store =
            AuthStore::from_config(&AuthConfig::with_base_url("http://127.0.0.1:9"), slow.clone())
                .unwrap();

        thread::scope(|scope| {
            scope.spawn(|| store.set_tokens(TokenPair::new("T1", "R1")));
            rx.recv().unwrap();
            store.set_tokens(TokenPair::new("T2", "R2"));
        });

        assert_eq!(store.tokens(), Some(TokenPair::new("T2", "R2")));
        assert_eq!(slow.inner.snapshot().tokens, Some(TokenPair::new("T2", "R2")));
        assert_eq!(store.state().stored_tokens, Some(TokenPair::new("T2", "R2")));
    }

    #[test]
    fn test_refresh_error_conversion() {
        let failed = RefreshError::RefreshFailed(AuthError::http_status(401, ""));
        assert_eq!(failed.to_string(), "Token refresh failed: HTTP 401");
        assert_eq!(AuthError::from(failed).status(), Some(401));
        assert_eq!(
            AuthError::from(RefreshError::NoRefreshToken),
            AuthError::NoRefreshToken
        );
    }
}
