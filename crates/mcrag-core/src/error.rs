//! Error types for multi-collection retrieval

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Hard failures of the retrieval system.
///
/// Failures scoped to a single collection are not represented here; they are
/// recorded as [`crate::CollectionFailure`] values in the retrieval outcome map.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid collection descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Collection already registered: {0}")]
    DuplicateCollection(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Retrieval cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
