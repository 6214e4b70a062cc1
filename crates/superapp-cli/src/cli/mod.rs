//! CLI entry and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use superapp_auth::AuthStore;
use superapp_auth::api::UpdateProfileData;
use superapp_auth::config::AuthConfig;
use superapp_auth::storage::FileStorage;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "superapp")]
#[command(version)]
#[command(about = "Superapp account and session management")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the auth service base URL
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "SUPERAPP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "SUPERAPP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// End the session (local state is cleared even if the service fails)
    Logout,

    /// Exchange the stored refresh token for a new pair
    Refresh,

    /// Show the current user as reported by the service
    Whoami,

    /// Show the local session state
    Status,

    /// Update profile fields
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// http(s) URL of the avatar image
        #[arg(long)]
        avatar: Option<String>,
    },

    /// Change or recover the account password
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },

    /// Confirm the email address with the emailed token
    VerifyEmail {
        #[arg(value_name = "TOKEN")]
        token: String,
    },

    /// Send the verification email again
    ResendVerification,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum PasswordCommands {
    /// Change the password of the logged-in account
    Change {
        #[arg(long)]
        current: Option<String>,
        #[arg(long = "new")]
        new_password: Option<String>,
    },
    /// Request a reset email
    Forgot {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with a reset token
    Reset {
        #[arg(long)]
        token: String,
        #[arg(long = "new")]
        new_password: Option<String>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

/// Logs go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Builds the store for this invocation and restores the saved session.
fn open_store(base_url: Option<&str>) -> Result<AuthStore> {
    let mut config = AuthConfig::load().context("load config")?;
    if let Some(url) = base_url {
        config = AuthConfig {
            base_url: url.to_string(),
            ..config
        }
        .validate()?;
    }

    let storage = FileStorage::default_location().context("locate auth storage")?;
    tracing::debug!(path = %storage.path().display(), base_url = %config.base_url, "opening auth store");
    let store = AuthStore::from_config(&config, Arc::new(storage)).context("create auth client")?;
    store.restore();
    Ok(store)
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, base_url } = cli;
    let store = || open_store(base_url.as_deref());

    match command {
        Commands::Login { email, password } => {
            commands::auth::login(&store()?, email, password).await
        }
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&store()?, name, email, password).await,
        Commands::Logout => commands::auth::logout(&store()?).await,
        Commands::Refresh => commands::auth::refresh(&store()?).await,
        Commands::Whoami => commands::auth::whoami(&store()?).await,
        Commands::Status => {
            commands::auth::status(&store()?);
            Ok(())
        }

        Commands::Profile {
            name,
            phone,
            bio,
            location,
            avatar,
        } => {
            let data = UpdateProfileData {
                name,
                phone,
                bio,
                location,
                avatar,
            };
            commands::account::update_profile(&store()?, &data).await
        }

        Commands::Password { command } => match command {
            PasswordCommands::Change {
                current,
                new_password,
            } => commands::account::change_password(&store()?, current, new_password).await,
            PasswordCommands::Forgot { email } => {
                commands::account::forgot_password(&store()?, &email).await
            }
            PasswordCommands::Reset {
                token,
                new_password,
            } => commands::account::reset_password(&store()?, &token, new_password).await,
        },

        Commands::VerifyEmail { token } => {
            commands::account::verify_email(&store()?, &token).await
        }
        Commands::ResendVerification => commands::account::resend_verification(&store()?).await,

        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
