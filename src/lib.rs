//! # curlbox
//!
//! Request ingestion for an API client: turns pasted curl commands and
//! exported collections into one request model, and keeps a de-duplicated
//! history plus a store of saved requests.
//!
//! ## Features
//! - curl parsing (methods, headers, data flags, forms, basic auth, cookies)
//! - curl export for saved requests
//! - Postman v2.0/v2.1 and Insomnia v4 collection import
//! - Content fingerprints for duplicate detection
//! - History and saved-request stores over a pluggable blob backend
//!
//! ## Architecture
//! Pure parsers on one side, persistence on the other:
//! - Ingestion (`curl`, `import`) - JSON/text in, `RequestRecord` out
//! - Identity (`fingerprint`) - stable digest of request content
//! - Storage (`storage`) - stores writing through a `BlobStore`

pub mod config;
pub mod constants;
pub mod curl;
pub mod error;
pub mod fingerprint;
pub mod import;
pub mod models;
pub mod query;
pub mod storage;

// Re-export commonly used types
pub use models::{
    AuthLocation, AuthType, BodyData, FormItem, FormItemType, Header, HttpMethod, KeyValue,
    QueryParam, RequestRecord,
};
pub use curl::{parse_curl, to_curl};
pub use fingerprint::{fingerprint, Fingerprint};
pub use error::IngestError;
pub use import::{import_document, parse_insomnia, parse_postman, parse_records, ImportFormat};
pub use storage::{BlobStore, FileBlobStore, HistoryStore, MemoryBlobStore, SavedStore};
pub use config::Config;
