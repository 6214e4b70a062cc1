//! Error taxonomy for the auth client.
//!
//! Token and session helpers swallow decode failures and return conservative
//! booleans; only `token::decode` surfaces [`AuthError::InvalidTokenFormat`].
//! The API client classifies transport failures as [`NetworkError`] and
//! response shape failures as [`ValidationError`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Crate-wide result alias.
pub type Result<T, E = AuthError> = std::result::Result<T, E>;

/// Categories of auth errors, used for logging and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    /// Bearer token could not be decoded
    InvalidTokenFormat,
    /// Transport failure (timeout, no connection, request build error)
    Network,
    /// Remote service answered with a non-2xx status
    HttpStatus,
    /// Payload failed a schema check
    Validation,
    /// Refresh requested without a stored refresh token
    NoRefreshToken,
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthErrorKind::InvalidTokenFormat => write!(f, "invalid_token_format"),
            AuthErrorKind::Network => write!(f, "network"),
            AuthErrorKind::HttpStatus => write!(f, "http_status"),
            AuthErrorKind::Validation => write!(f, "validation"),
            AuthErrorKind::NoRefreshToken => write!(f, "no_refresh_token"),
        }
    }
}

/// Classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkErrorKind {
    /// Connect or request timeout
    Timeout,
    /// Host unreachable or connection refused
    NoConnection,
    /// Any other transport-level failure
    Request,
}

/// Transport failure talking to the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkError {
    pub kind: NetworkErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Request URL, when known
    pub url: Option<String>,
}

impl NetworkError {
    pub fn new(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            url: None,
        }
    }

    pub fn timeout(url: Option<String>) -> Self {
        Self {
            kind: NetworkErrorKind::Timeout,
            message: "Request timeout".to_string(),
            url,
        }
    }

    pub fn no_connection(url: Option<String>) -> Self {
        Self {
            kind: NetworkErrorKind::NoConnection,
            message: "No internet connection".to_string(),
            url,
        }
    }

    /// Classifies a reqwest error.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let url = err.url().map(ToString::to_string);
        if err.is_timeout() {
            Self::timeout(url)
        } else if err.is_connect() {
            Self {
                kind: NetworkErrorKind::NoConnection,
                message: format!("Connection failed: {err}"),
                url,
            }
        } else {
            Self {
                kind: NetworkErrorKind::Request,
                message: format!("Request error: {err}"),
                url,
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == NetworkErrorKind::Timeout
    }

    pub fn is_no_connection(&self) -> bool {
        self.kind == NetworkErrorKind::NoConnection
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for NetworkError {}

/// A single failing field in a validated payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dot-separated path to the field (e.g. `user.email`)
    pub field: String,
    pub message: String,
    /// The offending value, when one was present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value,
        }
    }
}

/// Payload failed a schema check; carries one entry per failing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub message: String,
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(fields: Vec<FieldError>) -> Self {
        Self {
            message: "Validation failed".to_string(),
            fields,
        }
    }

    /// Creates a validation error for a single field.
    pub fn for_field(field: &str, message: &str, value: Option<Value>) -> Self {
        Self {
            message: message.to_string(),
            fields: vec![FieldError::new(field, message, value)],
        }
    }

    /// Returns the error recorded for `field`, if any.
    pub fn field_error(&self, field: &str) -> Option<&FieldError> {
        self.fields.iter().find(|f| f.field == field)
    }

    pub fn has_field_error(&self, field: &str) -> bool {
        self.field_error(field).is_some()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for (idx, field) in self.fields.iter().enumerate() {
            let sep = if idx == 0 { ": " } else { "; " };
            if field.field.is_empty() {
                write!(f, "{sep}{}", field.message)?;
            } else {
                write!(f, "{sep}{}: {}", field.field, field.message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Errors surfaced by the auth client and store.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    InvalidTokenFormat,
    Network(NetworkError),
    /// Non-2xx response; `message` is the service's own message when it sent one
    Http {
        status: u16,
        message: String,
    },
    Validation(ValidationError),
    NoRefreshToken,
}

impl AuthError {
    /// Creates an HTTP status error, extracting a message from a JSON body.
    ///
    /// Accepts `{"message": "..."}` and `{"error": {"message": "..."}}`.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .or_else(|| json.get("error").and_then(|e| e.get("message")))
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {status}"));
        AuthError::Http { status, message }
    }

    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::InvalidTokenFormat => AuthErrorKind::InvalidTokenFormat,
            AuthError::Network(_) => AuthErrorKind::Network,
            AuthError::Http { .. } => AuthErrorKind::HttpStatus,
            AuthError::Validation(_) => AuthErrorKind::Validation,
            AuthError::NoRefreshToken => AuthErrorKind::NoRefreshToken,
        }
    }

    /// HTTP status of the failed response, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidTokenFormat => write!(f, "Invalid token format"),
            AuthError::Network(e) => write!(f, "{e}"),
            AuthError::Http { message, .. } => write!(f, "{message}"),
            AuthError::Validation(e) => write!(f, "{e}"),
            AuthError::NoRefreshToken => write!(f, "No refresh token available"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Network(e) => Some(e),
            AuthError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NetworkError> for AuthError {
    fn from(err: NetworkError) -> Self {
        AuthError::Network(err)
    }
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        AuthError::Validation(err)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// Test: service-provided messages surface verbatim.
    #[test]
    fn test_http_status_extracts_message() {
        let err = AuthError::http_status(401, r#"{"message":"Invalid credentials"}"#);
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.status(), Some(401));

        let nested = AuthError::http_status(500, r#"{"error":{"message":"boom"}}"#);
        assert_eq!(nested.to_string(), "boom");
    }

    /// Test: bodies without a message fall back to the status line.
    #[test]
    fn test_http_status_fallback() {
        assert_eq!(AuthError::http_status(502, "").to_string(), "HTTP 502");
        assert_eq!(
            AuthError::http_status(404, "<html>not found</html>").to_string(),
            "HTTP 404"
        );
    }

    /// Test: validation display lists every failing field.
    #[test]
    fn test_validation_display() {
        let err = ValidationError::new(vec![
            FieldError::new("user.email", "Invalid email", Some(json!("nope"))),
            FieldError::new("tokens.accessToken", "Required", None),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: user.email: Invalid email; tokens.accessToken: Required"
        );
        assert!(err.has_field_error("user.email"));
        assert_eq!(
            err.field_error("user.email").and_then(|f| f.value.clone()),
            Some(json!("nope"))
        );
        assert!(!err.has_field_error("user.id"));
    }

    /// Test: network classification booleans.
    #[test]
    fn test_network_classification() {
        assert!(NetworkError::timeout(None).is_timeout());
        assert!(!NetworkError::timeout(None).is_no_connection());
        assert!(NetworkError::no_connection(None).is_no_connection());
        assert_eq!(
            AuthError::from(NetworkError::timeout(None)).kind(),
            AuthErrorKind::Network
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(AuthErrorKind::NoRefreshToken.to_string(), "no_refresh_token");
        assert_eq!(AuthError::NoRefreshToken.to_string(), "No refresh token available");
    }
}
