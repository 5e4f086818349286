//! Session storage backends.
//!
//! The session is one flat JSON object under a fixed key, the same blob a
//! browser front-end keeps in local storage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StorageResult;

/// Well-known key the session blob is stored under.
pub const STORAGE_KEY: &str = "neonWalletData";

/// The persisted session layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    /// Connected account, checksummed hex.
    pub address: String,
    /// Native balance at the time of saving, display string.
    pub balance: String,
    /// Whether the session was connected.
    pub is_connected: bool,
}

/// Trait for session storage backends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored session, if any.
    ///
    /// Data that does not parse is reported as an error so the caller can
    /// discard it.
    async fn load(&self) -> StorageResult<Option<PersistedSession>>;

    /// Replace the stored session.
    async fn save(&self, session: &PersistedSession) -> StorageResult<()>;

    /// Remove the stored session. Removing nothing is not an error.
    async fn clear(&self) -> StorageResult<()>;
}

/// In-memory session storage.
///
/// Holds the raw JSON text so that corrupt blobs behave as they would on disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: RwLock<Option<String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored text verbatim.
    pub async fn put_raw(&self, raw: impl Into<String>) {
        *self.raw.write().await = Some(raw.into());
    }

    /// The stored text, if any.
    pub async fn raw(&self) -> Option<String> {
        self.raw.read().await.clone()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self) -> StorageResult<Option<PersistedSession>> {
        match self.raw.read().await.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session: &PersistedSession) -> StorageResult<()> {
        let raw = serde_json::to_string(session)?;
        *self.raw.write().await = Some(raw);
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.raw.write().await.take();
        Ok(())
    }
}

/// File-based session storage.
///
/// Keeps the blob at `<dir>/neonWalletData.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the default location (`~/.neoncover`).
    #[must_use]
    pub fn default_path() -> Self {
        Self::new(default_dir())
    }

    /// Path of the session file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{STORAGE_KEY}.json"))
    }

    /// Directory holding the session file.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// `~/.neoncover`, or `./.neoncover` when there is no home directory.
pub(crate) fn default_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".neoncover")
}

#[async_trait]
impl SessionStore for FileStore {
    async fn load(&self) -> StorageResult<Option<PersistedSession>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let session = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "loaded session from file");
        Ok(Some(session))
    }

    async fn save(&self, session: &PersistedSession) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path();
        let content = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&path, content).await?;
        debug!(path = %path.display(), "saved session to file");
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        let path = self.path();
        if path.exists() {
            tokio::fs::remove_file(&path).await?;
            debug!(path = %path.display(), "deleted session file");
        }
        Ok(())
    }
}
