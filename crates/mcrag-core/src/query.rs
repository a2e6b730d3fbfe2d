//! Query and passage types

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of passages requested per collection when none is specified
pub const DEFAULT_TOP_K: usize = 5;

/// A retrieval request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub top_k: usize,
}

impl Query {
    /// Create a query with the default `top_k`
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the number of passages requested from each collection
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Reject queries that must never reach the network
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::InvalidQuery("query text is empty".to_string()));
        }
        if self.top_k == 0 {
            return Err(Error::InvalidQuery("top_k must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// A unit of retrieved text attributed to the collection it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub source_collection: String,
    pub content: String,
}

impl Passage {
    pub fn new(source_collection: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source_collection: source_collection.into(),
            content: content.into(),
        }
    }
}
