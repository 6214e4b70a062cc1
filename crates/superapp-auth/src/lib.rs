//! Superapp auth library (token helpers, API client, session store, guards).

pub mod api;
pub mod config;
pub mod error;
pub mod guards;
pub mod session;
pub mod storage;
pub mod store;
pub mod token;
pub mod types;
pub mod validation;

pub use api::AuthApiClient;
pub use config::AuthConfig;
pub use error::{AuthError, AuthErrorKind, Result};
pub use store::{AuthPhase, AuthState, AuthStore, RefreshError, Subscription};
pub use types::{Session, TokenPair, User, UserProfile};
