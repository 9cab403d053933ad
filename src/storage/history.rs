use crate::constants::HISTORY_KEY;
use crate::error::Result;
use crate::fingerprint::fingerprint;
use crate::models::RequestRecord;
use crate::storage::{system_clock, BlobStore, Clock, PersistedList};

/// Recently executed requests, most recent first.
///
/// Entries are de-duplicated by fingerprint: adding a request equal to an
/// existing entry moves it to the front instead of growing the list. Past
/// the limit the oldest positions fall off the tail.
pub struct HistoryStore<B: BlobStore> {
    list: PersistedList<B>,
    limit: usize,
    clock: Clock,
}

impl<B: BlobStore> HistoryStore<B> {
    pub fn open(backend: B, limit: usize) -> Result<Self> {
        Ok(HistoryStore {
            list: PersistedList::open(backend, HISTORY_KEY)?,
            limit,
            clock: system_clock(),
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Add entry to history
    pub fn add(&mut self, record: RequestRecord) -> Result<RequestRecord> {
        let mut record = record;
        record.sanitize();
        let fp = fingerprint(&record);

        let mut next = self.list.records.clone();
        if let Some(pos) = next.iter().position(|entry| fingerprint(entry) == fp) {
            next.remove(pos);
        }
        record.created_at = (self.clock)();
        next.insert(0, record.clone());
        next.truncate(self.limit);

        self.list.commit(next)?;
        tracing::info!(id = %record.id, fingerprint = %fp, len = self.len(), "Added request to history");
        Ok(record)
    }

    pub fn get_all(&self) -> &[RequestRecord] {
        &self.list.records
    }

    /// Get history item by index (0 = most recent)
    pub fn get(&self, index: usize) -> Option<&RequestRecord> {
        self.list.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.list.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.records.is_empty()
    }

    /// Remove an entry by id; `false` when there was none
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        if !self.list.records.iter().any(|r| r.id == id) {
            return Ok(false);
        }
        let next = self
            .list
            .records
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        self.list.commit(next)?;
        tracing::info!(id, "Deleted history entry");
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.list.clear()?;
        tracing::info!("Cleared history");
        Ok(())
    }

    /// The whole history as pretty JSON
    pub fn export_json(&self) -> Result<String> {
        self.list.export_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::models::{Header, HttpMethod};
    use crate::storage::MemoryBlobStore;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    fn step_clock() -> Clock {
        let now = Arc::new(AtomicI64::new(1_000));
        Arc::new(move || now.fetch_add(1, Ordering::SeqCst))
    }

    fn request(path: &str) -> RequestRecord {
        RequestRecord::imported(HttpMethod::GET, format!("https://api.example.com/{}", path))
    }

    fn urls(store: &HistoryStore<MemoryBlobStore>) -> Vec<String> {
        store.get_all().iter().map(|r| r.url.clone()).collect()
    }

    fn open(limit: usize) -> HistoryStore<MemoryBlobStore> {
        HistoryStore::open(MemoryBlobStore::new(), limit)
            .unwrap()
            .with_clock(step_clock())
    }

    #[test]
    fn newest_entry_is_first() {
        let mut store = open(10);
        store.add(request("a")).unwrap();
        store.add(request("b")).unwrap();
        assert_eq!(store.get(0).unwrap().url, "https://api.example.com/b");
        assert!(store.get(0).unwrap().created_at > store.get(1).unwrap().created_at);
    }

    #[test]
    fn over_limit_evicts_the_tail() {
        let mut store = open(3);
        for path in ["a", "b", "c", "d"] {
            store.add(request(path)).unwrap();
        }
        assert_eq!(store.len(), 3);
        assert_eq!(
            urls(&store),
            vec![
                "https://api.example.com/d",
                "https://api.example.com/c",
                "https://api.example.com/b"
            ]
        );
    }

    #[test]
    fn duplicate_moves_to_front_without_growing() {
        let mut store = open(3);
        for path in ["a", "b", "c"] {
            store.add(request(path)).unwrap();
        }
        let mut again = request("a");
        again.headers.push(Header::disabled("X-Debug", "1"));
        store.add(again).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(
            urls(&store),
            vec![
                "https://api.example.com/a",
                "https://api.example.com/c",
                "https://api.example.com/b"
            ]
        );

        // "a" was refreshed, so the next eviction hits "b"
        store.add(request("d")).unwrap();
        assert_eq!(
            urls(&store),
            vec![
                "https://api.example.com/d",
                "https://api.example.com/a",
                "https://api.example.com/c"
            ]
        );
    }

    #[test]
    fn reopening_reads_persisted_entries() {
        let backend = MemoryBlobStore::new();
        let mut store = HistoryStore::open(backend.clone(), 5).unwrap();
        let added = store.add(request("a")).unwrap();

        let reopened = HistoryStore::open(backend, 5).unwrap();
        assert_eq!(reopened.get_all(), &[added]);
    }

    #[test]
    fn delete_and_clear() {
        let mut store = open(5);
        let a = store.add(request("a")).unwrap();
        store.add(request("b")).unwrap();

        assert!(store.delete(&a.id).unwrap());
        assert!(!store.delete(&a.id).unwrap());
        assert_eq!(store.len(), 1);

        store.clear().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.export_json().unwrap(), "[]");
    }

    struct ReadOnlyBlobStore;

    impl BlobStore for ReadOnlyBlobStore {
        fn load(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn store(&self, _key: &str, _blob: &str) -> Result<()> {
            Err(IngestError::storage("read-only"))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(IngestError::storage("read-only"))
        }
    }

    #[test]
    fn failed_write_leaves_history_untouched() {
        let mut store = HistoryStore::open(ReadOnlyBlobStore, 5).unwrap();
        let err = store.add(request("a")).unwrap_err();
        assert!(matches!(err, IngestError::Storage(_)));
        assert!(store.is_empty());
    }
}
