//! Shape checks for service responses and user input.
//!
//! Response parsers walk the raw JSON first so that every failing field is
//! reported with its path, then hand the value to serde. Unknown keys are
//! ignored.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::api::types::{AuthResponse, LoginCredentials, RegisterData, UpdateProfileData};
use crate::error::{FieldError, ValidationError};
use crate::types::{TokenPair, User, UserProfile};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static LOWERCASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]").expect("valid lowercase regex"));
static UPPERCASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]").expect("valid uppercase regex"));
static DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("valid digit regex"));
static SPECIAL_CHAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z\d]").expect("valid special char regex"));

/// Minimum password length accepted by login and register.
pub const MIN_PASSWORD_LEN: usize = 6;
/// Minimum display-name length.
pub const MIN_NAME_LEN: usize = 2;

// === Response schemas ===

/// Validates a login/register response body.
///
/// # Errors
/// Returns a [`ValidationError`] listing every field that is missing or has
/// the wrong type.
pub fn parse_auth_response(value: Value) -> Result<AuthResponse, ValidationError> {
    let mut errors = Vec::new();
    if let Some(obj) = expect_object(&value, "", &mut errors) {
        match obj.get("user") {
            Some(user) => check_user(user, "user", &mut errors),
            None => errors.push(required("user")),
        }
        match obj.get("tokens") {
            Some(tokens) => check_token_pair(tokens, "tokens", &mut errors),
            None => errors.push(required("tokens")),
        }
    }
    finish(value, errors)
}

/// Validates a user body (`GET /auth/me`, `PATCH /auth/profile`).
///
/// # Errors
/// Returns a [`ValidationError`] listing every failing field.
pub fn parse_user(value: Value) -> Result<User, ValidationError> {
    let mut errors = Vec::new();
    check_user(&value, "", &mut errors);
    finish(value, errors)
}

/// Validates a user body carrying the optional profile fields.
///
/// # Errors
/// Returns a [`ValidationError`] listing every failing field.
pub fn parse_user_profile(value: Value) -> Result<UserProfile, ValidationError> {
    let mut errors = Vec::new();
    check_user(&value, "", &mut errors);
    if let Some(obj) = value.as_object() {
        for key in ["phone", "bio", "location"] {
            check_optional_string(obj, "", key, &mut errors);
        }
        if let Some(prefs) = obj.get("preferences")
            && !prefs.is_object()
        {
            errors.push(type_mismatch("preferences", "object", prefs));
        }
    }
    finish(value, errors)
}

/// Validates a token pair body (`POST /auth/refresh`).
///
/// # Errors
/// Returns a [`ValidationError`] listing every failing field.
pub fn parse_token_pair(value: Value) -> Result<TokenPair, ValidationError> {
    let mut errors = Vec::new();
    check_token_pair(&value, "", &mut errors);
    finish(value, errors)
}

fn finish<T: DeserializeOwned>(value: Value, errors: Vec<FieldError>) -> Result<T, ValidationError> {
    if !errors.is_empty() {
        return Err(ValidationError::new(errors));
    }
    serde_json::from_value(value)
        .map_err(|err| ValidationError::new(vec![FieldError::new("", err.to_string(), None)]))
}

fn check_user(value: &Value, path: &str, errors: &mut Vec<FieldError>) {
    let Some(obj) = expect_object(value, path, errors) else {
        return;
    };
    for key in ["id", "name", "createdAt", "updatedAt"] {
        check_required_string(obj, path, key, errors);
    }
    if let Some(email) = check_required_string(obj, path, "email", errors)
        && !validate_email(email)
    {
        errors.push(FieldError::new(
            join(path, "email"),
            "Invalid email",
            Some(Value::String(email.to_string())),
        ));
    }
    for key in ["avatar", "role"] {
        check_optional_string(obj, path, key, errors);
    }
    match obj.get("emailVerified") {
        Some(Value::Bool(_)) => {}
        Some(other) => errors.push(type_mismatch(&join(path, "emailVerified"), "boolean", other)),
        None => errors.push(required(&join(path, "emailVerified"))),
    }
}

fn check_token_pair(value: &Value, path: &str, errors: &mut Vec<FieldError>) {
    let Some(obj) = expect_object(value, path, errors) else {
        return;
    };
    for key in ["accessToken", "refreshToken"] {
        check_required_string(obj, path, key, errors);
    }
}

fn expect_object<'a>(
    value: &'a Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a Map<String, Value>> {
    let obj = value.as_object();
    if obj.is_none() {
        errors.push(type_mismatch(path, "object", value));
    }
    obj
}

fn check_required_string<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    key: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    let field = join(path, key);
    match obj.get(key) {
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            errors.push(type_mismatch(&field, "string", other));
            None
        }
        None => {
            errors.push(required(&field));
            None
        }
    }
}

fn check_optional_string(obj: &Map<String, Value>, path: &str, key: &str, errors: &mut Vec<FieldError>) {
    if let Some(value) = obj.get(key)
        && !value.is_string()
    {
        errors.push(type_mismatch(&join(path, key), "string", value));
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn required(field: &str) -> FieldError {
    FieldError::new(field, "Required", None)
}

fn type_mismatch(field: &str, expected: &str, got: &Value) -> FieldError {
    FieldError::new(
        field,
        format!("Expected {expected}, received {}", json_type_name(got)),
        Some(got.clone()),
    )
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// === Input schemas ===

/// Checks login input before it is sent.
///
/// # Errors
/// Returns a [`ValidationError`] with one entry per invalid field.
pub fn validate_login(credentials: &LoginCredentials) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    check_email_input(&credentials.email, &mut errors);
    check_password_input("password", &credentials.password, &mut errors);
    into_result(errors)
}

/// Checks registration input, including the password confirmation.
///
/// # Errors
/// Returns a [`ValidationError`] with one entry per invalid field.
pub fn validate_register(data: &RegisterData) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if data.name.chars().count() < MIN_NAME_LEN {
        errors.push(FieldError::new(
            "name",
            "Name must be at least 2 characters",
            Some(Value::String(data.name.clone())),
        ));
    }
    check_email_input(&data.email, &mut errors);
    check_password_input("password", &data.password, &mut errors);
    if data.password != data.confirm_password {
        errors.push(FieldError::new("confirmPassword", "Passwords don't match", None));
    }
    into_result(errors)
}

/// Checks a profile update: name length and avatar URL when present.
///
/// # Errors
/// Returns a [`ValidationError`] with one entry per invalid field.
pub fn validate_update_profile(data: &UpdateProfileData) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if let Some(name) = &data.name
        && name.chars().count() < MIN_NAME_LEN
    {
        errors.push(FieldError::new(
            "name",
            "Name must be at least 2 characters",
            Some(Value::String(name.clone())),
        ));
    }
    if let Some(avatar) = &data.avatar {
        let is_http_url = url::Url::parse(avatar)
            .is_ok_and(|u| matches!(u.scheme(), "http" | "https"));
        if !is_http_url {
            errors.push(FieldError::new(
                "avatar",
                "Invalid url",
                Some(Value::String(avatar.clone())),
            ));
        }
    }
    into_result(errors)
}

fn check_email_input(email: &str, errors: &mut Vec<FieldError>) {
    if !validate_email(email) {
        errors.push(FieldError::new(
            "email",
            "Invalid email address",
            Some(Value::String(email.to_string())),
        ));
    }
}

// Password values are never echoed back into errors.
fn check_password_input(field: &str, password: &str, errors: &mut Vec<FieldError>) {
    if !validate_password(password, MIN_PASSWORD_LEN) {
        errors.push(FieldError::new(
            field,
            "Password must be at least 6 characters",
            None,
        ));
    }
}

fn into_result(errors: Vec<FieldError>) -> Result<(), ValidationError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(errors))
    }
}

// === Helpers ===

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_password(password: &str, min_len: usize) -> bool {
    password.chars().count() >= min_len
}

/// Password strength score (0-4) with feedback for each unmet rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordStrength {
    pub score: u8,
    pub feedback: Vec<String>,
}

pub fn check_password_strength(password: &str) -> PasswordStrength {
    let rules: [(bool, &str); 4] = [
        (
            password.chars().count() >= 8,
            "Password should be at least 8 characters long",
        ),
        (
            LOWERCASE_RE.is_match(password) && UPPERCASE_RE.is_match(password),
            "Password should contain both uppercase and lowercase letters",
        ),
        (
            DIGIT_RE.is_match(password),
            "Password should contain at least one number",
        ),
        (
            SPECIAL_CHAR_RE.is_match(password),
            "Password should contain at least one special character",
        ),
    ];

    let mut strength = PasswordStrength {
        score: 0,
        feedback: Vec::new(),
    };
    for (passed, feedback) in rules {
        if passed {
            strength.score += 1;
        } else {
            strength.feedback.push(feedback.to_string());
        }
    }
    strength
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user_json() -> Value {
        json!({
            "id": "u1",
            "email": "a@b.com",
            "name": "Ana",
            "emailVerified": true,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        })
    }

    /// Test: a well-formed login response parses.
    #[test]
    fn test_parse_auth_response_ok() {
        let response = parse_auth_response(json!({
            "user": user_json(),
            "tokens": {"accessToken": "T1", "refreshToken": "R1"}
        }))
        .unwrap();
        assert_eq!(response.user.id, "u1");
        assert_eq!(response.tokens.access_token, "T1");
    }

    /// Test: every failing field is reported with its path.
    #[test]
    fn test_parse_auth_response_collects_all_fields() {
        let mut user = user_json();
        user["email"] = json!("not-an-email");
        user["emailVerified"] = json!("yes");
        user.as_object_mut().unwrap().remove("id");

        let err = parse_auth_response(json!({
            "user": user,
            "tokens": {"accessToken": 42}
        }))
        .unwrap_err();

        assert_eq!(err.message, "Validation failed");
        assert_eq!(err.fields.len(), 5);
        assert_eq!(err.field_error("user.id").unwrap().message, "Required");
        assert_eq!(err.field_error("user.email").unwrap().message, "Invalid email");
        assert_eq!(
            err.field_error("user.emailVerified").unwrap().message,
            "Expected boolean, received string"
        );
        assert_eq!(
            err.field_error("tokens.accessToken").unwrap().value,
            Some(json!(42))
        );
        assert!(err.has_field_error("tokens.refreshToken"));
    }

    #[test]
    fn test_parse_auth_response_non_object() {
        let err = parse_auth_response(json!("nope")).unwrap_err();
        assert_eq!(err.fields.len(), 1);
        assert_eq!(err.fields[0].field, "");
        assert_eq!(err.fields[0].message, "Expected object, received string");
    }

    /// Test: optional fields may be absent but not mistyped.
    #[test]
    fn test_parse_user_optional_fields() {
        let mut value = user_json();
        value["avatar"] = json!("https://cdn.example.com/a.png");
        assert_eq!(
            parse_user(value.clone()).unwrap().avatar.as_deref(),
            Some("https://cdn.example.com/a.png")
        );

        value["role"] = Value::Null;
        let err = parse_user(value).unwrap_err();
        assert_eq!(err.fields[0].field, "role");
        assert_eq!(err.fields[0].message, "Expected string, received null");
    }

    #[test]
    fn test_parse_user_profile() {
        let mut value = user_json();
        value["bio"] = json!("hello");
        value["preferences"] = json!({"lang": "es"});
        let profile = parse_user_profile(value.clone()).unwrap();
        assert_eq!(profile.bio.as_deref(), Some("hello"));

        value["preferences"] = json!([1, 2]);
        assert!(parse_user_profile(value).unwrap_err().has_field_error("preferences"));
    }

    #[test]
    fn test_parse_token_pair() {
        let pair = parse_token_pair(json!({"accessToken": "T2", "refreshToken": "R2"})).unwrap();
        assert_eq!(pair, TokenPair::new("T2", "R2"));
        assert!(parse_token_pair(json!({})).unwrap_err().has_field_error("accessToken"));
    }

    #[test]
    fn test_validate_login() {
        assert!(validate_login(&LoginCredentials::new("a@b.com", "secret1")).is_ok());

        let err = validate_login(&LoginCredentials::new("bad", "123")).unwrap_err();
        assert_eq!(
            err.field_error("email").unwrap().message,
            "Invalid email address"
        );
        let password = err.field_error("password").unwrap();
        assert_eq!(password.message, "Password must be at least 6 characters");
        assert!(password.value.is_none());
    }

    #[test]
    fn test_validate_register() {
        let mut data = RegisterData {
            name: "Ana".to_string(),
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        assert!(validate_register(&data).is_ok());

        data.name = "A".to_string();
        data.confirm_password = "secret2".to_string();
        let err = validate_register(&data).unwrap_err();
        assert_eq!(err.fields.len(), 2);
        assert_eq!(
            err.field_error("confirmPassword").unwrap().message,
            "Passwords don't match"
        );
        assert!(err.has_field_error("name"));
    }

    #[test]
    fn test_validate_update_profile() {
        assert!(validate_update_profile(&UpdateProfileData::default()).is_ok());

        let data = UpdateProfileData {
            name: Some("Jo".to_string()),
            avatar: Some("https://cdn.example.com/jo.png".to_string()),
            ..UpdateProfileData::default()
        };
        assert!(validate_update_profile(&data).is_ok());

        let data = UpdateProfileData {
            name: Some("J".to_string()),
            avatar: Some("ftp://files/jo.png".to_string()),
            ..UpdateProfileData::default()
        };
        let err = validate_update_profile(&data).unwrap_err();
        assert!(err.has_field_error("name"));
        assert!(err.has_field_error("avatar"));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.com"));
        assert!(validate_email("first.last+tag@sub.example.org"));
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a b@c.com"));
        assert!(!validate_email(""));
    }

    /// Test: each strength rule contributes one point.
    #[test]
    fn test_password_strength() {
        let weak = check_password_strength("abc");
        assert_eq!(weak.score, 0);
        assert_eq!(weak.feedback.len(), 4);

        let medium = check_password_strength("abcdefgH");
        assert_eq!(medium.score, 2);
        assert_eq!(
            medium.feedback,
            vec![
                "Password should contain at least one number".to_string(),
                "Password should contain at least one special character".to_string(),
            ]
        );

        let strong = check_password_strength("Abcdef1!");
        assert_eq!(strong.score, 4);
        assert!(strong.feedback.is_empty());
    }
}
