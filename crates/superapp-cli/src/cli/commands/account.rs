//! Account command handlers: profile, password, email verification.

use anyhow::{Context, Result, bail};
use superapp_auth::AuthStore;
use superapp_auth::api::UpdateProfileData;
use superapp_auth::validation::{self, MIN_PASSWORD_LEN};

use super::prompt::value_or_prompt;

fn require_login(store: &AuthStore) -> Result<()> {
    if !store.is_authenticated() {
        bail!("Not logged in. Run `superapp login` first.");
    }
    Ok(())
}

fn check_new_password(password: &str) -> Result<()> {
    if !validation::validate_password(password, MIN_PASSWORD_LEN) {
        bail!("Password must be at least {MIN_PASSWORD_LEN} characters");
    }
    Ok(())
}

pub async fn update_profile(store: &AuthStore, data: &UpdateProfileData) -> Result<()> {
    require_login(store)?;
    if data.is_empty() {
        bail!("Nothing to update; pass at least one of --name, --phone, --bio, --location, --avatar");
    }
    validation::validate_update_profile(data)?;

    let user = store.update_profile(data).await.context("update profile")?;
    println!("✓ Profile updated for {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn change_password(
    store: &AuthStore,
    current: Option<String>,
    new_password: Option<String>,
) -> Result<()> {
    require_login(store)?;
    let current = value_or_prompt(current, "Current password")?;
    let new_password = value_or_prompt(new_password, "New password")?;
    check_new_password(&new_password)?;

    store
        .api()
        .change_password(&current, &new_password)
        .await
        .context("change password")?;
    println!("✓ Password changed");
    Ok(())
}

pub async fn forgot_password(store: &AuthStore, email: &str) -> Result<()> {
    if !validation::validate_email(email) {
        bail!("Invalid email address: {email}");
    }
    store
        .api()
        .forgot_password(email)
        .await
        .context("request password reset")?;
    println!("✓ If {email} has an account, a reset link is on its way.");
    Ok(())
}

pub async fn reset_password(
    store: &AuthStore,
    token: &str,
    new_password: Option<String>,
) -> Result<()> {
    let new_password = value_or_prompt(new_password, "New password")?;
    check_new_password(&new_password)?;

    store
        .api()
        .reset_password(token, &new_password)
        .await
        .context("reset password")?;
    println!("✓ Password reset; log in with the new password.");
    Ok(())
}

pub async fn verify_email(store: &AuthStore, token: &str) -> Result<()> {
    store
        .api()
        .verify_email(token)
        .await
        .context("verify email")?;
    println!("✓ Email verified");
    Ok(())
}

pub async fn resend_verification(store: &AuthStore) -> Result<()> {
    require_login(store)?;
    store
        .api()
        .resend_verification_email()
        .await
        .context("resend verification email")?;
    println!("✓ Verification email sent");
    Ok(())
}
