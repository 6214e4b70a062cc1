//! Bearer token inspection.
//!
//! Tokens are JWTs in compact form (`header.payload.signature`). Only the
//! payload is read; signatures are the issuing service's concern.
//!
//! Failure direction differs per helper: [`is_expired`] and [`is_valid`]
//! treat an unreadable token as expired/invalid, while [`should_refresh`]
//! treats it as due for refresh. Both push toward re-authentication.
//!
//! Every clock-dependent helper has an `_at` variant taking `now_ms`.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{AuthError, Result};
use crate::types::{DecodedToken, TokenMetadata};

/// Refresh when fewer than this many minutes remain.
pub const DEFAULT_REFRESH_THRESHOLD_MINUTES: u64 = 5;

/// Wall clock in milliseconds since epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u64::try_from(d.as_millis()).ok())
        .unwrap_or(u64::MAX)
}

/// Decodes the claims of `token`.
///
/// # Errors
/// Returns [`AuthError::InvalidTokenFormat`] if the token is not three
/// dot-separated segments or the payload is not base64url JSON with an
/// `exp` claim.
pub fn decode(token: &str) -> Result<DecodedToken> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::InvalidTokenFormat);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(invalid_format)?;
    serde_json::from_slice(&bytes).map_err(invalid_format)
}

fn invalid_format(err: impl std::fmt::Display) -> AuthError {
    tracing::trace!(%err, "token decode failed");
    AuthError::InvalidTokenFormat
}

pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, now_millis())
}

/// True when `exp` lies before `now_ms`; undecodable tokens count as expired.
pub fn is_expired_at(token: &str, now_ms: u64) -> bool {
    match decode(token) {
        Ok(decoded) => decoded.expires_at_millis() < now_ms,
        Err(_) => true,
    }
}

/// Expiry in milliseconds since epoch, `None` if the token is unreadable.
pub fn expiration_time_millis(token: &str) -> Option<u64> {
    decode(token).ok().map(|d| d.expires_at_millis())
}

pub fn time_until_expiration_millis(token: &str) -> Option<u64> {
    time_until_expiration_millis_at(token, now_millis())
}

/// Milliseconds left before expiry, clamped at zero.
pub fn time_until_expiration_millis_at(token: &str, now_ms: u64) -> Option<u64> {
    expiration_time_millis(token).map(|exp| exp.saturating_sub(now_ms))
}

pub fn should_refresh(token: &str, threshold_minutes: u64) -> bool {
    should_refresh_at(token, threshold_minutes, now_millis())
}

/// True if the remaining lifetime is unknown or under the threshold.
pub fn should_refresh_at(token: &str, threshold_minutes: u64, now_ms: u64) -> bool {
    let threshold_ms = threshold_minutes.saturating_mul(60 * 1000);
    match time_until_expiration_millis_at(token, now_ms) {
        Some(remaining) => remaining < threshold_ms,
        None => true,
    }
}

pub fn is_valid(token: &str) -> bool {
    is_valid_at(token, now_millis())
}

/// Decodable, unexpired, and carrying both `sub` and `email`.
pub fn is_valid_at(token: &str, now_ms: u64) -> bool {
    if token.is_empty() {
        return false;
    }
    match decode(token) {
        Ok(decoded) => {
            !is_expired_at(token, now_ms) && !decoded.sub.is_empty() && !decoded.email.is_empty()
        }
        Err(_) => false,
    }
}

pub fn metadata(token: &str) -> Option<TokenMetadata> {
    let decoded = decode(token).ok()?;
    Some(TokenMetadata {
        expires_at: decoded.expires_at_millis(),
        issued_at: decoded.issued_at_millis(),
        user_id: decoded.sub,
        email: decoded.email,
    })
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(12).collect();
    format!("{prefix}...")
}
