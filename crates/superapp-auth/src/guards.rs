//! Route guards and read-only views over [`AuthState`].
//!
//! Guards decide between the protected content and a fallback, and fire a
//! navigation callback when the session condition settles. They are
//! UI-agnostic: feed them every state the store publishes via
//! [`AuthGuard::observe`] / [`GuestGuard::observe`].

use std::fmt;

use crate::store::AuthState;
use crate::token;
use crate::types::{TokenPair, User};

/// What a guard wants rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Fallback,
    Children,
}

type Callback = Box<dyn FnMut() + Send>;

/// `(is_authenticated, is_loading)` as of the last observation.
type Observed = Option<(bool, bool)>;

fn observed_changed(last: &mut Observed, state: &AuthState) -> bool {
    let current = Some((state.is_authenticated, state.is_loading));
    if *last == current {
        return false;
    }
    *last = current;
    true
}

/// Shows its content only to an authenticated, settled session.
#[derive(Default)]
pub struct AuthGuard {
    on_unauthenticated: Option<Callback>,
    last: Observed,
}

impl AuthGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback fired once loading settles without a session.
    #[must_use]
    pub fn on_unauthenticated(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_unauthenticated = Some(Box::new(callback));
        self
    }

    pub fn evaluate(state: &AuthState) -> GuardDecision {
        if state.is_loading || !state.is_authenticated {
            GuardDecision::Fallback
        } else {
            GuardDecision::Children
        }
    }

    /// Evaluates `state`, firing the callback when the observed flags changed
    /// and the session is settled and anonymous.
    pub fn observe(&mut self, state: &AuthState) -> GuardDecision {
        if observed_changed(&mut self.last, state)
            && !state.is_loading
            && !state.is_authenticated
            && let Some(callback) = self.on_unauthenticated.as_mut()
        {
            tracing::debug!("auth guard: redirecting unauthenticated session");
            callback();
        }
        Self::evaluate(state)
    }
}

impl fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGuard")
            .field("has_callback", &self.on_unauthenticated.is_some())
            .field("last", &self.last)
            .finish()
    }
}

/// Shows its content only to a settled anonymous session (login pages).
#[derive(Default)]
pub struct GuestGuard {
    on_authenticated: Option<Callback>,
    last: Observed,
}

impl GuestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback fired once loading settles with a session.
    #[must_use]
    pub fn on_authenticated(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_authenticated = Some(Box::new(callback));
        self
    }

    pub fn evaluate(state: &AuthState) -> GuardDecision {
        if state.is_loading || state.is_authenticated {
            GuardDecision::Fallback
        } else {
            GuardDecision::Children
        }
    }

    pub fn observe(&mut self, state: &AuthState) -> GuardDecision {
        if observed_changed(&mut self.last, state)
            && !state.is_loading
            && state.is_authenticated
            && let Some(callback) = self.on_authenticated.as_mut()
        {
            tracing::debug!("guest guard: redirecting authenticated session");
            callback();
        }
        Self::evaluate(state)
    }
}

impl fmt::Debug for GuestGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestGuard")
            .field("has_callback", &self.on_authenticated.is_some())
            .field("last", &self.last)
            .finish()
    }
}

/// Token-centric view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub tokens: Option<TokenPair>,
    pub is_authenticated: bool,
    /// Access token decodes and is unexpired
    pub is_valid: bool,
    /// Access token is within the refresh threshold
    pub needs_refresh: bool,
}

impl SessionView {
    pub fn from_state(state: &AuthState) -> Self {
        Self::from_state_at(state, token::now_millis())
    }

    pub fn from_state_at(state: &AuthState, now_ms: u64) -> Self {
        let access = state
            .tokens
            .as_ref()
            .map(|t| t.access_token.as_str())
            .filter(|t| !t.is_empty());
        Self {
            tokens: state.tokens.clone(),
            is_authenticated: state.is_authenticated,
            is_valid: access.is_some_and(|t| token::is_valid_at(t, now_ms)),
            needs_refresh: access.is_some_and(|t| {
                token::should_refresh_at(t, token::DEFAULT_REFRESH_THRESHOLD_MINUTES, now_ms)
            }),
        }
    }
}

/// User-centric view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub user: Option<User>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl UserView {
    pub fn from_state(state: &AuthState) -> Self {
        Self {
            user: state.user.clone(),
            is_loading: state.is_loading,
            error: state.error.clone(),
        }
    }
}
