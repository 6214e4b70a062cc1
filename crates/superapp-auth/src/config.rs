//! Configuration for the auth client.
//!
//! Loads configuration from ${SUPERAPP_HOME}/config.toml with sensible defaults.
//!
//! Resolution order per setting:
//! 1. Environment variable (`SUPERAPP_AUTH_URL`, `SUPERAPP_AUTH_TIMEOUT_SECS`)
//! 2. `[auth]` table in config.toml
//! 3. Built-in default

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config template with comments, embedded at compile time.
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("default_config.toml");

/// Env var overriding the auth service base URL.
pub const AUTH_URL_ENV: &str = "SUPERAPP_AUTH_URL";
/// Env var overriding the request timeout, in seconds.
pub const AUTH_TIMEOUT_ENV: &str = "SUPERAPP_AUTH_TIMEOUT_SECS";

pub mod paths {
    //! Path resolution for superapp configuration and data directories.
    //!
    //! SUPERAPP_HOME resolution order:
    //! 1. SUPERAPP_HOME environment variable (if set)
    //! 2. ~/.config/superapp (default)

    use std::path::PathBuf;

    use anyhow::{Result, anyhow};

    /// Returns the superapp home directory.
    ///
    /// # Errors
    /// Returns an error if `SUPERAPP_HOME` is unset and no home directory exists.
    pub fn superapp_home() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("SUPERAPP_HOME") {
            return Ok(PathBuf::from(home));
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("superapp"))
            .ok_or_else(|| anyhow!("Could not determine home directory"))
    }

    /// Returns the path to the config.toml file.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        Ok(superapp_home()?.join("config.toml"))
    }
}

/// Top-level config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
}

/// Settings for the auth service client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Base URL of the auth service (no trailing slash)
    pub base_url: String,
    /// Per-request timeout in seconds (0 disables)
    pub timeout_secs: u64,
}

impl AuthConfig {
    pub const DEFAULT_BASE_URL: &str = "https://auth.domain.com";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Config pointing at `base_url` with the default timeout.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Loads and resolves the auth config from the default config path.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed, or if
    /// the resolved settings are invalid.
    pub fn load() -> Result<Self> {
        Ok(Config::load()?.auth)
    }

    /// Applies env overrides on top of `self` and validates the result.
    ///
    /// # Errors
    /// Returns an error if an override is malformed or the base URL is not an
    /// absolute http(s) URL.
    pub fn resolve(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var(AUTH_URL_ENV)
            && !url.trim().is_empty()
        {
            self.base_url = url.trim().to_string();
        }
        if let Ok(secs) = std::env::var(AUTH_TIMEOUT_ENV)
            && !secs.trim().is_empty()
        {
            self.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid {AUTH_TIMEOUT_ENV}: '{secs}'"))?;
        }
        self.validate()
    }

    /// Normalizes the base URL and checks it is usable.
    ///
    /// # Errors
    /// Returns an error if the base URL is not an absolute http(s) URL.
    pub fn validate(mut self) -> Result<Self> {
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&trimmed)
            .with_context(|| format!("Invalid auth base URL: '{}'", self.base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!(
                "Invalid auth base URL: '{}' (expected http or https)",
                self.base_url
            );
        }
        self.base_url = trimmed;
        Ok(self)
    }

    /// Request timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or resolved.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path()?)
    }

    /// Loads configuration from a specific path and applies env overrides.
    /// Returns defaults if the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or resolved.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str::<Config>(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            Config::default()
        };
        config.auth = config.auth.resolve()?;
        Ok(config)
    }

    /// Writes the default template to `path`.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, DEFAULT_CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}
