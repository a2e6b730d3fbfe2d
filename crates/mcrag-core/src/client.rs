//! Per-collection query client trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::{CollectionDescriptor, Passage};

/// Passages returned by one successful collection query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionHits {
    pub passages: Vec<Passage>,
    /// Documents in the response that carried no usable content
    pub skipped: usize,
}

/// Why a single collection query produced no passages.
///
/// These never abort a retrieval; they are recorded against the collection in
/// the retrieval outcome map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectionFailure {
    /// The call did not settle within its time bound
    Timeout { after_ms: u64 },
    /// The remote service answered with a non-success status
    Remote { status_code: u16, body: String },
    /// The request could not be sent or the response could not be read
    Transport { message: String },
    /// The response body could not be interpreted
    Malformed { message: String },
    /// The query task itself failed (panicked or was aborted)
    Task { message: String },
}

impl CollectionFailure {
    pub fn timeout(after: Duration) -> Self {
        CollectionFailure::Timeout {
            after_ms: after.as_millis() as u64,
        }
    }
}

impl fmt::Display for CollectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionFailure::Timeout { after_ms } => {
                write!(f, "timed out after {}ms", after_ms)
            }
            CollectionFailure::Remote { status_code, body } => {
                write!(f, "remote returned status {}: {}", status_code, body)
            }
            CollectionFailure::Transport { message } => write!(f, "transport error: {}", message),
            CollectionFailure::Malformed { message } => write!(f, "malformed response: {}", message),
            CollectionFailure::Task { message } => write!(f, "query task failed: {}", message),
        }
    }
}

/// Trait for remote vector-search backends.
///
/// One call issues exactly one request against one collection; implementations
/// must not retry and must bound the call in time, reporting an overrun as
/// [`CollectionFailure::Timeout`].
#[async_trait]
pub trait CollectionQueryClient: Send + Sync {
    /// Search `descriptor`'s collection for passages relevant to `query_text`
    async fn query(
        &self,
        descriptor: &CollectionDescriptor,
        query_text: &str,
        top_k: usize,
    ) -> Result<CollectionHits, CollectionFailure>;
}

