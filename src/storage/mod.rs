//! Request stores and the blob persistence they write through
//!
//! Both stores keep the whole collection in memory and write it back as one
//! JSON blob after every mutation. The in-memory copy only changes once the
//! write succeeded.

pub mod blob;
pub mod history;
pub mod saved;

use std::sync::Arc;

use crate::error::Result;
use crate::models::{now_millis, RequestRecord};

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use history::HistoryStore;
pub use saved::SavedStore;

/// Source of "now" in epoch milliseconds
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(now_millis)
}

/// A record list mirrored into one blob
struct PersistedList<B: BlobStore> {
    backend: B,
    key: &'static str,
    records: Vec<RequestRecord>,
}

impl<B: BlobStore> PersistedList<B> {
    fn open(backend: B, key: &'static str) -> Result<Self> {
        let records: Vec<RequestRecord> = match backend.load(key)? {
            Some(blob) if !blob.trim().is_empty() => serde_json::from_str(&blob)?,
            _ => Vec::new(),
        };
        tracing::debug!(key, count = records.len(), "Loaded request collection");
        Ok(PersistedList {
            backend,
            key,
            records,
        })
    }

    /// Write `next` and adopt it; on failure nothing changes
    fn commit(&mut self, next: Vec<RequestRecord>) -> Result<()> {
        let blob = serde_json::to_string_pretty(&next)?;
        self.backend.store(self.key, &blob)?;
        self.records = next;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.backend.remove(self.key)?;
        self.records.clear();
        Ok(())
    }

    fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }
}
