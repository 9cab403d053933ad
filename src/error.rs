//! Error taxonomy for the ingestion pipeline and request stores

/// Errors surfaced by importers and stores
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The curl command contained no usable http(s) URL
    #[error("no http(s) URL found in curl command")]
    NoUrlFound,
    /// A collection document had the wrong top-level shape
    #[error("malformed collection JSON: {0}")]
    MalformedCollectionJson(String),
    /// The bulk import payload was not a list of records
    #[error("invalid import payload: {0}")]
    InvalidImportPayload(String),
    /// The persistence collaborator failed
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error")]
    Serialization(#[from] serde_json::Error),
}

impl IngestError {
    pub fn malformed(message: impl Into<String>) -> Self {
        IngestError::MalformedCollectionJson(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        IngestError::Storage(message.into())
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            IngestError::NoUrlFound => {
                "Could not find a URL in the curl command. Make sure it contains an http:// or https:// address.".to_owned()
            }
            IngestError::MalformedCollectionJson(detail) => {
                format!("The collection file is not in the expected format: {detail}")
            }
            IngestError::InvalidImportPayload(detail) => {
                format!("Nothing was imported: {detail}")
            }
            IngestError::Storage(detail) => format!("Could not write to storage: {detail}"),
            IngestError::Serialization(err) => format!("Could not encode requests: {err}"),
        }
    }
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
