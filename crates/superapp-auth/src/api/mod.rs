//! HTTP client for the remote auth service.
//!
//! Endpoints (relative to the configured base URL):
//! - `POST /auth/login`, `POST /auth/register`, `POST /auth/logout`
//! - `POST /auth/refresh`, `GET /auth/me`, `PATCH /auth/profile`
//! - `POST /auth/change-password`, `POST /auth/forgot-password`,
//!   `POST /auth/reset-password`
//! - `POST /auth/verify-email`, `POST /auth/resend-verification`
//!
//! Login, register, me and profile responses are schema-checked before they
//! are returned.

mod client;
pub mod types;

pub use client::AuthApiClient;
pub use types::{
    AuthResponse, LoginCredentials, RefreshTokenResponse, RegisterData, UpdateProfileData,
};
