//! Content fingerprint used to de-duplicate history entries.
//!
//! Only the enabled header and query rows take part, sorted, so reordering
//! rows or switching one off does not produce a new entry. Not a security
//! primitive.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::{KeyValue, RequestRecord};

/// Hex-encoded SHA-256 digest of a record's semantic content
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of a record
pub fn fingerprint(record: &RequestRecord) -> Fingerprint {
    let mut hasher = Sha256::new();

    write_field(&mut hasher, record.method.as_str().as_bytes());
    write_field(&mut hasher, record.url.as_bytes());
    write_rows(&mut hasher, &record.headers);
    write_rows(&mut hasher, &record.query_params);
    write_field(&mut hasher, record.body.as_bytes());
    write_field(&mut hasher, structural(&record.body_data).as_bytes());
    write_field(&mut hasher, structural(&record.auth).as_bytes());

    Fingerprint(hex::encode(hasher.finalize()))
}

/// Length-prefixed so adjacent fields cannot run into each other
fn write_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn write_rows(hasher: &mut Sha256, rows: &[KeyValue]) {
    let mut pairs: Vec<String> = rows
        .iter()
        .filter(|row| row.checked)
        .map(|row| format!("{}:{}", row.key.to_lowercase(), row.value))
        .collect();
    pairs.sort();

    hasher.update((pairs.len() as u64).to_le_bytes());
    for pair in &pairs {
        write_field(hasher, pair.as_bytes());
    }
}

fn structural<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
