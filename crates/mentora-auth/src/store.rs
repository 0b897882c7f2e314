//! Token storage backends.
//!
//! Handles reading, writing, and clearing the bearer token that authenticates
//! requests against the Mentora API.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

// ============================================================================
// TokenStore Trait
// ============================================================================

/// Accessor contract for the process-wide access-token slot.
///
/// At most one token is current at any time; `set` overwrites it, `clear`
/// empties the slot. None of the operations fail: storage that is missing or
/// unreadable reads as an absent token, and write failures are logged and
/// swallowed so a broken disk never takes the request pipeline down with it.
///
/// The slot may be written by flows outside any client (a login screen storing
/// the first token, for example), so consumers must re-read on every use
/// rather than caching the value.
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Read the current token. `None` if never set, cleared, or unreadable.
    fn get(&self) -> Option<String>;

    /// Overwrite the stored token unconditionally.
    fn set(&self, token: &str);

    /// Remove the stored token. Idempotent.
    fn clear(&self);
}

// ============================================================================
// FileTokenStore
// ============================================================================

/// File-backed token store for production use.
///
/// The token survives process restarts, the way a browser session survives a
/// page reload. Every `get` re-reads the file so that concurrent writers
/// (another process, a login flow) are always observed.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn set(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                tracing::warn!(
                    "failed to create token directory {}: {}",
                    parent.display(),
                    err
                );
                return;
            }
        }

        if let Err(err) = std::fs::write(&self.path, token) {
            tracing::warn!("failed to write token file {}: {}", self.path.display(), err);
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!("failed to remove token file {}: {}", self.path.display(), err);
            }
        }
    }
}

// ============================================================================
// InMemoryTokenStore
// ============================================================================

/// In-memory token store for tests and non-persistent contexts.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn set(&self, token: &str) {
        *self.token.write() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.write() = None;
    }
}

// ============================================================================
// Shared Token Store
// ============================================================================

/// Shared token store for use across async contexts.
pub type SharedTokenStore = Arc<dyn TokenStore>;

/// Create a shared file-backed token store.
pub fn create_file_token_store(path: impl Into<PathBuf>) -> SharedTokenStore {
    Arc::new(FileTokenStore::new(path))
}

/// Create a shared in-memory token store.
pub fn create_memory_token_store() -> SharedTokenStore {
    Arc::new(InMemoryTokenStore::new())
}
