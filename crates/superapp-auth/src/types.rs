//! Identity, token and session records.
//!
//! Wire names are camelCase to match the auth service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity record owned by the store and replaced wholesale on change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub email_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A user with the optional profile fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<BTreeMap<String, Value>>,
}

/// Access + refresh bearer strings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens are credentials; never print them in full.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &crate::token::mask_token(&self.access_token))
            .field("refresh_token", &crate::token::mask_token(&self.refresh_token))
            .finish()
    }
}

/// Claims decoded from an access token payload. Derived on demand, never stored.
///
/// `exp` and `iat` are NumericDate values and may carry fractional seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedToken {
    /// Subject (user id); empty when the claim is absent
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub email: String,
    /// Expiry, seconds since epoch
    pub exp: f64,
    /// Issued-at, seconds since epoch
    #[serde(default)]
    pub iat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl DecodedToken {
    pub fn expires_at_millis(&self) -> u64 {
        seconds_to_millis(self.exp)
    }

    pub fn issued_at_millis(&self) -> u64 {
        seconds_to_millis(self.iat)
    }
}

/// Negative and NaN inputs map to 0, overflow to `u64::MAX`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn seconds_to_millis(secs: f64) -> u64 {
    (secs * 1000.0) as u64
}

/// Token claims converted to milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub expires_at: u64,
    pub issued_at: u64,
    pub user_id: String,
    pub email: String,
}

/// Logical session: user + tokens + derived expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    pub tokens: TokenPair,
    /// Milliseconds since epoch
    pub expires_at: u64,
    /// Milliseconds since epoch
    pub created_at: u64,
}
