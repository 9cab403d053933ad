//! Bulk import of previously exported request records

use serde_json::Value;

use crate::error::{IngestError, Result};
use crate::models::RequestRecord;

/// Parse a JSON array of records. Entries that do not decode are skipped;
/// anything other than an array imports nothing.
pub fn parse_records(document: &Value) -> Result<Vec<RequestRecord>> {
    let entries = document.as_array().ok_or_else(|| {
        IngestError::InvalidImportPayload("expected a JSON array of requests".to_string())
    })?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            tracing::warn!(index, "Skipping import entry that is not an object");
            continue;
        }
        match serde_json::from_value::<RequestRecord>(entry.clone()) {
            Ok(record) => records.push(record),
            Err(err) => tracing::warn!(index, error = %err, "Skipping undecodable import entry"),
        }
    }
    Ok(records)
}
