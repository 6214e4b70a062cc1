//! Persisted copy of the last-known tokens and user.
//!
//! The store mirrors every token/user change through [`SecureStorage`] so a
//! later process can restore the session. [`FileStorage`] keeps the record in
//! `<home>/auth.json` with restricted permissions (0600); tokens are never
//! logged in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;
use crate::types::{TokenPair, User};

/// Auth storage filename.
const AUTH_STORAGE_FILE: &str = "auth.json";

/// Last-known session material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredAuth {
    pub tokens: Option<TokenPair>,
    pub user: Option<User>,
}

impl StoredAuth {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_none() && self.user.is_none()
    }
}

/// On-disk layout, one key per stored item.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_data: Option<User>,
}

impl From<&StoredAuth> for StorageFile {
    fn from(stored: &StoredAuth) -> Self {
        Self {
            auth_token: stored.tokens.as_ref().map(|t| t.access_token.clone()),
            refresh_token: stored.tokens.as_ref().map(|t| t.refresh_token.clone()),
            user_data: stored.user.clone(),
        }
    }
}

impl From<StorageFile> for StoredAuth {
    fn from(file: StorageFile) -> Self {
        // A pair is only usable whole.
        let tokens = match (file.auth_token, file.refresh_token) {
            (Some(access), Some(refresh)) => Some(TokenPair::new(access, refresh)),
            _ => None,
        };
        Self {
            tokens,
            user: file.user_data,
        }
    }
}

/// Durable storage for the session material.
pub trait SecureStorage: Send + Sync {
    /// Loads the stored record; an empty record when nothing is stored.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read or parsed.
    fn load(&self) -> Result<StoredAuth>;

    /// Replaces the stored record.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn save(&self, stored: &StoredAuth) -> Result<()>;

    /// Removes everything. Returns whether anything was stored.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn clear(&self) -> Result<bool>;
}

/// JSON file storage with 0600 permissions on unix.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `<SUPERAPP_HOME>/auth.json`.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(paths::superapp_home()?.join(AUTH_STORAGE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, contents: &str) -> Result<()> {
        let path = &self.path;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }
}

impl SecureStorage for FileStorage {
    fn load(&self) -> Result<StoredAuth> {
        if !self.path.exists() {
            return Ok(StoredAuth::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read auth storage from {}", self.path.display()))?;
        let file: StorageFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse auth storage from {}", self.path.display()))?;
        Ok(file.into())
    }

    fn save(&self, stored: &StoredAuth) -> Result<()> {
        let contents = serde_json::to_string_pretty(&StorageFile::from(stored))
            .context("Failed to serialize auth storage")?;
        self.write_file(&contents)
    }

    fn clear(&self) -> Result<bool> {
        // A corrupt file still counts as stored and is removed.
        let had_auth = match self.load() {
            Ok(stored) => !stored.is_empty(),
            Err(_) => true,
        };
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(had_auth)
    }
}

/// In-process storage for tests and embedders without a disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<StoredAuth>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(stored: StoredAuth) -> Self {
        Self {
            inner: Mutex::new(stored),
        }
    }

    /// Current contents, for inspection.
    pub fn snapshot(&self) -> StoredAuth {
        self.inner
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl SecureStorage for MemoryStorage {
    fn load(&self) -> Result<StoredAuth> {
        Ok(self.snapshot())
    }

    fn save(&self, stored: &StoredAuth) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| anyhow::anyhow!("memory storage poisoned: {e}"))?;
        *guard = stored.clone();
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| anyhow::anyhow!("memory storage poisoned: {e}"))?;
        let had_auth = !guard.is_empty();
        *guard = StoredAuth::default();
        Ok(had_auth)
    }
}
