//! Collection importers - Postman, Insomnia and previously exported records
//!
//! Every importer degrades missing or mistyped fields to defaults; only a
//! wrong top-level shape is an error.

pub mod insomnia;
pub mod postman;
pub mod records;

use serde_json::Value;

use crate::constants::{APPLICATION_JSON, TEXT_PLAIN};
use crate::error::{IngestError, Result};
use crate::models::RequestRecord;

pub use insomnia::parse_insomnia;
pub use postman::parse_postman;
pub use records::parse_records;

/// Document formats understood by [`import_document`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportFormat {
    Postman,
    Insomnia,
    /// A JSON array of exported `RequestRecord`s
    Records,
}

impl ImportFormat {
    pub fn as_str(&self) -> &str {
        match self {
            ImportFormat::Postman => "Postman",
            ImportFormat::Insomnia => "Insomnia",
            ImportFormat::Records => "Records",
        }
    }
}

/// Guess the format of an already parsed document
pub fn detect_format(document: &Value) -> Option<ImportFormat> {
    if document.is_array() {
        return Some(ImportFormat::Records);
    }
    let object = document.as_object()?;

    if object.contains_key("resources") || str_field(document, "_type") == "export" {
        return Some(ImportFormat::Insomnia);
    }

    let schema = document
        .get("info")
        .or_else(|| document.get("collection").and_then(|c| c.get("info")))
        .map(|info| str_field(info, "schema"))
        .unwrap_or_default();
    if object.contains_key("item") || object.contains_key("collection") || schema.contains("postman") {
        return Some(ImportFormat::Postman);
    }

    None
}

/// Detect the format of a document and run the matching importer
pub fn import_document(document: &Value) -> Result<(ImportFormat, Vec<RequestRecord>)> {
    let format = detect_format(document).ok_or_else(|| {
        IngestError::InvalidImportPayload(
            "not a Postman collection, Insomnia export or list of requests".to_string(),
        )
    })?;

    let records = match format {
        ImportFormat::Postman => parse_postman(document)?,
        ImportFormat::Insomnia => parse_insomnia(document)?,
        ImportFormat::Records => parse_records(document)?,
    };
    tracing::info!(format = format.as_str(), count = records.len(), "Imported requests");
    Ok((format, records))
}

/// String field, or empty when missing or not a string
pub(crate) fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(String::from)
        .unwrap_or_default()
}

/// Scalar field rendered as text: numbers and booleans show up in the wild
/// where strings are expected
pub(crate) fn text_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

pub(crate) fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// MIME type guessed from the body text
pub(crate) fn guess_content_type(body: &str) -> &'static str {
    let trimmed = body.trim_start();
    if trimmed.starts_with(['{', '[']) {
        APPLICATION_JSON
    } else if trimmed.starts_with('<') {
        "application/xml"
    } else {
        TEXT_PLAIN
    }
}

pub(crate) fn basename(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .to_string()
}
