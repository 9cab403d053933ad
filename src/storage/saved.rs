use crate::constants::SAVED_KEY;
use crate::error::Result;
use crate::models::{time_based_id, RequestRecord};
use crate::storage::{system_clock, BlobStore, Clock, PersistedList};

/// Requests the user saved explicitly, identified by `id`.
///
/// Over the limit the store is re-sorted newest first by `created_at` and
/// truncated, so the globally oldest requests go first no matter where they
/// sit in the list.
pub struct SavedStore<B: BlobStore> {
    list: PersistedList<B>,
    limit: usize,
    clock: Clock,
}

impl<B: BlobStore> SavedStore<B> {
    pub fn open(backend: B, limit: usize) -> Result<Self> {
        Ok(SavedStore {
            list: PersistedList::open(backend, SAVED_KEY)?,
            limit,
            clock: system_clock(),
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Insert or replace a request. A replaced request keeps its original
    /// `created_at`; a request without id gets a time-based one.
    pub fn save(&mut self, record: RequestRecord) -> Result<RequestRecord> {
        let now = (self.clock)();
        let mut next = self.list.records.clone();
        let saved = upsert(&mut next, record, now);
        self.enforce_limit(&mut next);

        self.list.commit(next)?;
        tracing::info!(id = %saved.id, len = self.len(), "Saved request");
        Ok(saved)
    }

    /// Merge a batch of records in one write. Imported `created_at` values
    /// are kept when set.
    pub fn import(&mut self, records: Vec<RequestRecord>) -> Result<usize> {
        let now = (self.clock)();
        let count = records.len();
        let mut next = self.list.records.clone();
        for record in records {
            let imported_at = record.created_at;
            let is_new = !next.iter().any(|r| r.id == record.id);
            let saved = upsert(&mut next, record, now);
            if is_new && imported_at > 0 {
                if let Some(entry) = next.iter_mut().find(|r| r.id == saved.id) {
                    entry.created_at = imported_at;
                }
            }
        }
        self.enforce_limit(&mut next);

        self.list.commit(next)?;
        tracing::info!(count, len = self.len(), "Imported saved requests");
        Ok(count)
    }

    pub fn get_all(&self) -> &[RequestRecord] {
        &self.list.records
    }

    pub fn get(&self, id: &str) -> Option<&RequestRecord> {
        self.list.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.list.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.records.is_empty()
    }

    /// Remove a request by id; `false` when there was none
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        if self.get(id).is_none() {
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
        tracing::info!(id, "Deleted saved request");
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.list.clear()?;
        tracing::info!("Cleared saved requests");
        Ok(())
    }

    /// All saved requests as pretty JSON, readable by `parse_records`
    pub fn export_json(&self) -> Result<String> {
        self.list.export_json()
    }

    fn enforce_limit(&self, records: &mut Vec<RequestRecord>) {
        if records.len() > self.limit {
            records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            records.truncate(self.limit);
        }
    }
}

fn upsert(records: &mut Vec<RequestRecord>, record: RequestRecord, now: i64) -> RequestRecord {
    let mut record = record;
    record.sanitize();
    if record.id.trim().is_empty() {
        record.id = time_based_id(now);
    }

    match records.iter_mut().find(|r| r.id == record.id) {
        Some(existing) => {
            record.created_at = existing.created_at;
            *existing = record.clone();
        }
        None => {
            record.created_at = now;
            records.push(record.clone());
        }
    }
    record
}
