//! Session command handlers: login, register, logout, refresh, whoami, status.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use superapp_auth::api::{LoginCredentials, RegisterData};
use superapp_auth::guards::SessionView;
use superapp_auth::token::{self, mask_token};
use superapp_auth::{AuthError, AuthStore, User, validation};

use super::prompt::value_or_prompt;

pub async fn login(store: &AuthStore, email: String, password: Option<String>) -> Result<()> {
    if store.is_authenticated()
        && let Some(user) = store.user()
    {
        println!("Already logged in as {}; replacing session.", user.email);
    }

    let password = value_or_prompt(password, "Password")?;
    let credentials = LoginCredentials::new(email, password);
    validation::validate_login(&credentials)?;

    store.login(&credentials).await.context("login")?;

    let user = store.user().context("login returned no user")?;
    println!("✓ Logged in as {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn register(
    store: &AuthStore,
    name: String,
    email: String,
    password: Option<String>,
) -> Result<()> {
    let password = value_or_prompt(password, "Password")?;
    let data = RegisterData {
        name,
        email,
        confirm_password: password.clone(),
        password,
    };
    validation::validate_register(&data)?;

    let strength = validation::check_password_strength(&data.password);
    for hint in &strength.feedback {
        eprintln!("hint: {hint}");
    }

    store.register(&data).await.context("register")?;

    let user = store.user().context("register returned no user")?;
    println!("✓ Registered and logged in as {} <{}>", user.name, user.email);
    if !user.email_verified {
        println!("  Check your inbox to verify {}.", user.email);
    }
    Ok(())
}

pub async fn logout(store: &AuthStore) -> Result<()> {
    if !store.is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }

    store.logout().await;
    println!("✓ Logged out");
    Ok(())
}

pub async fn refresh(store: &AuthStore) -> Result<()> {
    match store.refresh_token().await {
        Ok(tokens) => {
            println!("✓ Session refreshed (token: {})", mask_token(&tokens.access_token));
            print_expiry(&tokens.access_token);
            Ok(())
        }
        Err(AuthError::NoRefreshToken) => bail!("Not logged in (no refresh token stored)."),
        Err(err) => Err(anyhow::Error::new(err).context("refresh session (local session cleared)")),
    }
}

pub async fn whoami(store: &AuthStore) -> Result<()> {
    if !store.is_authenticated() {
        bail!("Not logged in. Run `superapp login` first.");
    }
    let user = store.fetch_current_user().await.context("fetch current user")?;
    print_user(&user);
    Ok(())
}

pub fn status(store: &AuthStore) {
    let state = store.state();
    println!("Status: {}", state.phase());

    match &state.user {
        Some(user) => println!("User:   {} <{}>", user.name, user.email),
        None => println!("User:   -"),
    }

    let Some(tokens) = &state.tokens else {
        println!("Tokens: none");
        return;
    };
    println!("Access:  {}", mask_token(&tokens.access_token));
    println!("Refresh: {}", mask_token(&tokens.refresh_token));
    print_expiry(&tokens.access_token);

    let view = SessionView::from_state(&state);
    if !view.is_valid {
        println!("Token is expired or unreadable; run `superapp refresh` or log in again.");
    } else if view.needs_refresh {
        println!("Token expires soon; run `superapp refresh`.");
    }
}

fn print_user(user: &User) {
    println!("ID:       {}", user.id);
    println!("Name:     {}", user.name);
    println!("Email:    {}", user.email);
    if let Some(role) = &user.role {
        println!("Role:     {role}");
    }
    println!("Verified: {}", if user.email_verified { "yes" } else { "no" });
}

fn print_expiry(access_token: &str) {
    let Some(expires_ms) = token::expiration_time_millis(access_token) else {
        println!("Expires: unknown");
        return;
    };
    let when = i64::try_from(expires_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(
            || expires_ms.to_string(),
            |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
    let remaining_min = token::time_until_expiration_millis(access_token).unwrap_or(0) / 60_000;
    println!("Expires: {when} (in {remaining_min} min)");
}
