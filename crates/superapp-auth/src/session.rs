//! Session derivation and lifetime checks.

use crate::token::{self, now_millis};
use crate::types::{Session, TokenPair, User};

/// Lifetime assumed when the access token carries no readable expiry (24h).
pub const DEFAULT_SESSION_LIFETIME_MS: u64 = 24 * 60 * 60 * 1000;

pub fn create_session(user: User, tokens: TokenPair) -> Session {
    create_session_at(user, tokens, now_millis())
}

/// Builds a session whose expiry is the access token's `exp`, or
/// `now + 24h` when that cannot be read.
pub fn create_session_at(user: User, tokens: TokenPair, now_ms: u64) -> Session {
    let expires_at = token::expiration_time_millis(&tokens.access_token)
        .unwrap_or_else(|| now_ms.saturating_add(DEFAULT_SESSION_LIFETIME_MS));
    Session {
        user,
        tokens,
        expires_at,
        created_at: now_ms,
    }
}

pub fn is_session_valid(session: Option<&Session>) -> bool {
    is_session_valid_at(session, now_millis())
}

pub fn is_session_valid_at(session: Option<&Session>, now_ms: u64) -> bool {
    let Some(session) = session else {
        return false;
    };
    let TokenPair {
        access_token,
        refresh_token,
    } = &session.tokens;

    if access_token.is_empty() || refresh_token.is_empty() {
        return false;
    }
    if now_ms > session.expires_at {
        return false;
    }
    token::is_valid_at(access_token, now_ms)
}

pub fn is_session_expired(session: Option<&Session>) -> bool {
    is_session_expired_at(session, now_millis())
}

pub fn is_session_expired_at(session: Option<&Session>, now_ms: u64) -> bool {
    session.is_none_or(|s| now_ms > s.expires_at)
}

pub fn should_refresh_session(session: Option<&Session>, threshold_minutes: u64) -> bool {
    should_refresh_session_at(session, threshold_minutes, now_millis())
}

/// Defers to the access token; no session means nothing to refresh.
pub fn should_refresh_session_at(
    session: Option<&Session>,
    threshold_minutes: u64,
    now_ms: u64,
) -> bool {
    session.is_some_and(|s| token::should_refresh_at(&s.tokens.access_token, threshold_minutes, now_ms))
}

pub fn time_until_expiration(session: Option<&Session>) -> Option<u64> {
    time_until_expiration_at(session, now_millis())
}

pub fn time_until_expiration_at(session: Option<&Session>, now_ms: u64) -> Option<u64> {
    session.map(|s| s.expires_at.saturating_sub(now_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::DEFAULT_REFRESH_THRESHOLD_MINUTES;
    use crate::token::test_support::jwt_expiring_at;

    const NOW_MS: u64 = 1_700_000_000_000;
    const NOW_SECS: u64 = NOW_MS / 1000;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: "a@b.com".to_string(),
            name: "Ana".to_string(),
            avatar: None,
            role: None,
            email_verified: true,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn session_expiring_in(secs: u64) -> Session {
        let tokens = TokenPair::new(jwt_expiring_at(NOW_SECS + secs), "R1");
        create_session_at(user(), tokens, NOW_MS)
    }

    /// Test: expiry comes from the token's `exp` claim.
    #[test]
    fn test_create_session_uses_exp() {
        let session = session_expiring_in(3600);
        assert_eq!(session.expires_at, (NOW_SECS + 3600) * 1000);
        assert_eq!(session.created_at, NOW_MS);
    }

    /// Test: unreadable access tokens default to a 24h session.
    #[test]
    fn test_create_session_defaults_to_24h() {
        let session = create_session_at(user(), TokenPair::new("opaque", "R1"), NOW_MS);
        assert_eq!(session.expires_at, NOW_MS + 86_400_000);
    }

    #[test]
    fn test_is_session_valid() {
        assert!(is_session_valid_at(Some(&session_expiring_in(3600)), NOW_MS));
        assert!(!is_session_valid_at(None, NOW_MS));

        let mut no_refresh = session_expiring_in(3600);
        no_refresh.tokens.refresh_token.clear();
        assert!(!is_session_valid_at(Some(&no_refresh), NOW_MS));

        // within the session window but the access token itself is opaque
        let opaque = create_session_at(user(), TokenPair::new("opaque", "R1"), NOW_MS);
        assert!(!is_session_valid_at(Some(&opaque), NOW_MS));

        let past = session_expiring_in(60);
        assert!(!is_session_valid_at(Some(&past), NOW_MS + 61_000));
    }

    #[test]
    fn test_is_session_expired() {
        assert!(is_session_expired_at(None, NOW_MS));
        let session = session_expiring_in(60);
        assert!(!is_session_expired_at(Some(&session), NOW_MS));
        assert!(!is_session_expired_at(Some(&session), session.expires_at));
        assert!(is_session_expired_at(Some(&session), session.expires_at + 1));
    }

    #[test]
    fn test_should_refresh_session() {
        let threshold = DEFAULT_REFRESH_THRESHOLD_MINUTES;
        assert!(!should_refresh_session_at(None, threshold, NOW_MS));
        assert!(should_refresh_session_at(
            Some(&session_expiring_in(120)),
            threshold,
            NOW_MS
        ));
        assert!(!should_refresh_session_at(
            Some(&session_expiring_in(3600)),
            threshold,
            NOW_MS
        ));
    }

    #[test]
    fn test_time_until_expiration() {
        assert_eq!(time_until_expiration_at(None, NOW_MS), None);
        let session = session_expiring_in(60);
        assert_eq!(time_until_expiration_at(Some(&session), NOW_MS), Some(60_000));
        assert_eq!(
            time_until_expiration_at(Some(&session), NOW_MS + 120_000),
            Some(0)
        );
    }
}
