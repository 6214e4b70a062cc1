//! Shared helpers for auth integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use superapp_auth::storage::{MemoryStorage, SecureStorage};
use superapp_auth::{AuthApiClient, AuthConfig, AuthStore};
use wiremock::{MockServer, ResponseTemplate};

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Unsigned JWT with the given `exp` (seconds).
pub fn jwt(exp_secs: u64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = json!({
        "sub": "u1",
        "email": "a@b.com",
        "exp": exp_secs,
        "iat": exp_secs.saturating_sub(3600),
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2ln")
}

pub fn user_json(id: &str) -> Value {
    json!({
        "id": id,
        "email": "a@b.com",
        "name": "Ana",
        "emailVerified": true,
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    })
}

pub fn auth_body(access: &str, refresh: &str) -> Value {
    json!({
        "user": user_json("u1"),
        "tokens": { "accessToken": access, "refreshToken": refresh }
    })
}

pub fn json_response(status: u16, body: &Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

pub fn client(server: &MockServer) -> AuthApiClient {
    AuthApiClient::new(&AuthConfig::with_base_url(server.uri())).unwrap()
}

pub fn store(server: &MockServer) -> (AuthStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let shared: Arc<dyn SecureStorage> = storage.clone();
    let store = AuthStore::new(client(server), shared);
    (store, storage)
}
