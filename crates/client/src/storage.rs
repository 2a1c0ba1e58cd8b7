//! Durable storage for the session token
//!
//! The session only ever keeps one string under one well-known key. Whether a
//! durable store exists is decided once, when the [`Persistence`] capability
//! is handed to the session; callers never check for it again.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

/// Key-value surface backing the persisted token
pub trait TokenStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> io::Result<()>;

    /// Remove the value under `key`; removing a missing key succeeds
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Storage capability selected at startup
#[derive(Clone, Default)]
pub enum Persistence {
    /// A durable store is present
    Available(Arc<dyn TokenStore>),
    /// No durable store in this environment; every operation is a no-op
    #[default]
    Unavailable,
}

impl Persistence {
    /// Wrap a store as an available capability
    pub fn available(store: impl TokenStore + 'static) -> Self {
        Self::Available(Arc::new(store))
    }

    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub(crate) fn load(&self, key: &str) -> Option<String> {
        let Self::Available(store) = self else {
            return None;
        };
        match store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read persisted token: {}", e);
                None
            }
        }
    }

    pub(crate) fn save(&self, key: &str, value: &str) {
        if let Self::Available(store) = self {
            if let Err(e) = store.set(key, value) {
                warn!("Failed to persist token: {}", e);
            }
        }
    }

    pub(crate) fn remove(&self, key: &str) {
        if let Self::Available(store) = self {
            if let Err(e) = store.remove(key) {
                warn!("Failed to remove persisted token: {}", e);
            }
        }
    }
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(_) => f.write_str("Persistence::Available"),
            Self::Unavailable => f.write_str("Persistence::Unavailable"),
        }
    }
}

/// Token store keeping one file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    directory: PathBuf,
}

impl FileTokenStore {
    /// Create a store rooted at `directory`; the directory is created on first write
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(key)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.directory)?;
        std::fs::write(self.path_for(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Process-local token store; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value without going through the session
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.peek(key))
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
