use std::sync::{PoisonError, RwLock};

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use super::types::{
    AuthResponse, ChangePasswordRequest, EmailRequest, LoginCredentials, RefreshRequest,
    RefreshTokenResponse, RegisterData, ResetPasswordRequest, TokenRequest, UpdateProfileData,
};
use crate::config::AuthConfig;
use crate::error::{AuthError, NetworkError, NetworkErrorKind, Result, ValidationError};
use crate::token::mask_token;
use crate::types::User;
use crate::validation;

/// Auth service client.
///
/// Single attempt per call: transport and validation failures are returned
/// as-is and retry policy is left to the caller.
pub struct AuthApiClient {
    base_url: String,
    http: reqwest::Client,
    /// Shared bearer token, read at dispatch time by every request.
    auth_token: RwLock<Option<String>>,
}

impl AuthApiClient {
    /// Creates a client for `config.base_url` with JSON default headers and
    /// the configured timeout.
    ///
    /// # Errors
    /// Returns a network error if the HTTP client cannot be built.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            NetworkError::new(
                NetworkErrorKind::Request,
                format!("Failed to build HTTP client: {e}"),
            )
        })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            auth_token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sets or clears the bearer token used by every request dispatched
    /// after this call. Requests already sent are unaffected.
    pub fn set_auth_token(&self, token: Option<&str>) {
        let mut guard = self
            .auth_token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = token.filter(|t| !t.is_empty()).map(ToString::to_string);
    }

    /// Current bearer token, if one is set.
    pub fn auth_token(&self) -> Option<String> {
        self.auth_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Value of the `Authorization` header that the next request will carry.
    pub fn authorization_header(&self) -> Option<String> {
        self.auth_token().map(|token| format!("Bearer {token}"))
    }

    // === Endpoints ===

    /// `POST /auth/login`
    ///
    /// # Errors
    /// Network, HTTP status, or validation errors.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        let body = Self::execute(self.request(Method::POST, "/auth/login").json(credentials))
            .await?;
        Ok(validation::parse_auth_response(body)?)
    }

    /// `POST /auth/register`
    ///
    /// # Errors
    /// Network, HTTP status, or validation errors.
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse> {
        let body = Self::execute(self.request(Method::POST, "/auth/register").json(data))
            .await?;
        Ok(validation::parse_auth_response(body)?)
    }

    /// `POST /auth/logout`
    ///
    /// # Errors
    /// Network or HTTP status errors.
    pub async fn logout(&self) -> Result<()> {
        Self::execute_empty(self.request(Method::POST, "/auth/logout"))
            .await
    }

    /// `POST /auth/refresh`
    ///
    /// # Errors
    /// Network, HTTP status, or validation errors.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshTokenResponse> {
        let request = self
            .request(Method::POST, "/auth/refresh")
            .json(&RefreshRequest { refresh_token });
        let body = Self::execute(request).await?;
        Ok(validation::parse_token_pair(body)?)
    }

    /// `GET /auth/me`
    ///
    /// # Errors
    /// Network, HTTP status, or validation errors.
    pub async fn get_current_user(&self) -> Result<User> {
        let body = Self::execute(self.request(Method::GET, "/auth/me")).await?;
        Ok(validation::parse_user(body)?)
    }

    /// `PATCH /auth/profile`
    ///
    /// # Errors
    /// Network, HTTP status, or validation errors.
    pub async fn update_profile(&self, data: &UpdateProfileData) -> Result<User> {
        let body = Self::execute(self.request(Method::PATCH, "/auth/profile").json(data))
            .await?;
        Ok(validation::parse_user(body)?)
    }

    /// `POST /auth/change-password`
    ///
    /// # Errors
    /// Network or HTTP status errors.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        self.post_empty(
            "/auth/change-password",
            &ChangePasswordRequest {
                current_password,
                new_password,
            },
        )
        .await
    }

    /// `POST /auth/forgot-password`
    ///
    /// # Errors
    /// Network or HTTP status errors.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        self.post_empty("/auth/forgot-password", &EmailRequest { email })
            .await
    }

    /// `POST /auth/reset-password`
    ///
    /// # Errors
    /// Network or HTTP status errors.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        self.post_empty(
            "/auth/reset-password",
            &ResetPasswordRequest {
                token,
                new_password,
            },
        )
        .await
    }

    /// `POST /auth/verify-email`
    ///
    /// # Errors
    /// Network or HTTP status errors.
    pub async fn verify_email(&self, token: &str) -> Result<()> {
        self.post_empty("/auth/verify-email", &TokenRequest { token })
            .await
    }

    /// `POST /auth/resend-verification`
    ///
    /// # Errors
    /// Network or HTTP status errors.
    pub async fn resend_verification_email(&self) -> Result<()> {
        Self::execute_empty(self.request(Method::POST, "/auth/resend-verification"))
            .await
    }

    // === Plumbing ===

    /// Builds a request, attaching the bearer token as of now.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "auth request");
        let builder = self.http.request(method, url);
        match self.authorization_header() {
            Some(header) => builder.header(AUTHORIZATION, header),
            None => builder,
        }
    }

    async fn post_empty<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        Self::execute_empty(self.request(Method::POST, path).json(body))
            .await
    }

    /// Sends the request and returns the JSON body (`null` when empty).
    async fn execute(builder: RequestBuilder) -> Result<Value> {
        let response = Self::send(builder).await?;
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Network(NetworkError::from_reqwest(&e)))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            AuthError::Validation(ValidationError::for_field(
                "",
                &format!("Invalid JSON response: {e}"),
                None,
            ))
        })
    }

    async fn execute_empty(builder: RequestBuilder) -> Result<()> {
        Self::send(builder).await.map(drop)
    }

    async fn send(builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await.map_err(|e| {
            let err = NetworkError::from_reqwest(&e);
            tracing::debug!(kind = ?err.kind, error = %err, "auth request failed");
            AuthError::Network(err)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = AuthError::http_status(status.as_u16(), &body);
        tracing::debug!(status = status.as_u16(), error = %err, "auth request rejected");
        Err(err)
    }
}

impl std::fmt::Debug for AuthApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthApiClient")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token().as_deref().map(mask_token))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AuthApiClient {
        AuthApiClient::new(&AuthConfig::with_base_url("http://127.0.0.1:9/")).unwrap()
    }

    /// Test: trailing slash is dropped from the base URL.
    #[test]
    fn test_base_url_normalized() {
        assert_eq!(client().base_url(), "http://127.0.0.1:9");
    }

    /// Test: bearer header follows set/clear.
    #[test]
    fn test_set_auth_token() {
        let client = client();
        assert_eq!(client.authorization_header(), None);

        client.set_auth_token(Some("T1"));
        assert_eq!(client.authorization_header().as_deref(), Some("Bearer T1"));

        client.set_auth_token(Some(""));
        assert_eq!(client.auth_token(), None);

        client.set_auth_token(Some("T2"));
        client.set_auth_token(None);
        assert_eq!(client.auth_token(), None);
    }

    /// Test: Debug output masks the bearer token.
    #[test]
    fn test_debug_masks_token() {
        let client = client();
        let token = "eyJhbGciOiJIUzI1NiJ9.secret-payload.signature";
        client.set_auth_token(Some(token));

        let out = format!("{client:?}");
        assert!(out.contains("eyJhbGciOiJI..."));
        assert!(!out.contains("secret-payload"));
        assert!(out.contains("http://127.0.0.1:9"));
    }
}
