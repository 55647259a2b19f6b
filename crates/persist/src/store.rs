//! Blob store backends.
//!
//! Layout of a file-backed store directory:
//! ```text
//! experiences.json
//! userPreferences.json
//! pendingFeedback.json
//! ...
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {key:?}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid key {0:?}: only letters, digits, '-' and '_' are allowed")]
    InvalidKey(String),
}

/// Minimal key-value store of text blobs.
pub trait BlobStore {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write (replace) a value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Whether the key currently holds a value.
    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Directory-backed store: one `<key>.json` file per key.
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Open or create a store at the given directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "blob store opened");
        Ok(Self { root })
    }

    /// Get the path to the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        // Write then rename so readers never see a half-written blob.
        let tmp = self.root.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        tracing::trace!(key, bytes = value.len(), "blob written");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and offline sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: BTreeMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.blobs.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_open_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileBlobStore::open(tmp.path().join("data")).unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn file_store_set_get_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileBlobStore::open(tmp.path()).unwrap();

        assert_eq!(store.get("experiences").unwrap(), None);
        store.set("experiences", "[]").unwrap();
        assert_eq!(store.get("experiences").unwrap().as_deref(), Some("[]"));
        assert!(store.contains("experiences").unwrap());

        store.set("experiences", "[1]").unwrap();
        assert_eq!(store.get("experiences").unwrap().as_deref(), Some("[1]"));
        assert!(!tmp.path().join("experiences.json.tmp").exists());

        store.remove("experiences").unwrap();
        assert_eq!(store.get("experiences").unwrap(), None);
        // Removing again is fine.
        store.remove("experiences").unwrap();
    }

    #[test]
    fn file_store_reopen_preserves_values() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let mut store = FileBlobStore::open(tmp.path()).unwrap();
            store.set("userPreferences", "{}").unwrap();
        }
        let store = FileBlobStore::open(tmp.path()).unwrap();
        assert_eq!(store.get("userPreferences").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn invalid_keys_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileBlobStore::open(tmp.path()).unwrap();
        for key in ["", "../escape", "a/b", "with space"] {
            assert!(matches!(
                store.set(key, "x"),
                Err(StoreError::InvalidKey(_))
            ));
        }
        let mut mem = MemoryBlobStore::new();
        assert!(mem.set("bad key", "x").is_err());
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryBlobStore::new();
        assert!(store.is_empty());
        store.set("aiEnabled", "false").unwrap();
        assert_eq!(store.get("aiEnabled").unwrap().as_deref(), Some("false"));
        assert_eq!(store.len(), 1);
        store.remove("aiEnabled").unwrap();
        assert!(!store.contains("aiEnabled").unwrap());
    }
}
