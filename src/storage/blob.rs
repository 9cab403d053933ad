//! Key-value blob persistence

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::{IngestError, Result};

/// Durable storage for whole collections, one blob per key
pub trait BlobStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn store(&self, key: &str, blob: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory blob store; clones share the same blobs
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.blobs
            .lock()
            .map_err(|_| IngestError::storage("memory blob store lock poisoned"))
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn store(&self, key: &str, blob: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Stores each blob as `<key>.json` inside a directory
#[derive(Clone, Debug)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileBlobStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Ensure the storage directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                IngestError::storage(format!("failed to create `{}`: {e}", self.dir.display()))
            })?;
        }
        Ok(())
    }
}

impl BlobStore for FileBlobStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| IngestError::storage(format!("failed to read `{}`: {e}", path.display())))
    }

    fn store(&self, key: &str, blob: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.path_for(key);
        // Write to a sibling file first so a failed write keeps the old blob
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, blob)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| IngestError::storage(format!("failed to write `{}`: {e}", path.display())))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(&path)
            .map_err(|e| IngestError::storage(format!("failed to remove `{}`: {e}", path.display())))
    }
}
