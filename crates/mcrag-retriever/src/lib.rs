//! Multi-collection retrieval for MCRAG
//!
//! This crate fans a query out to every registered collection, merges the
//! settled results in registry order, and exposes the retriever as an agent
//! tool.

mod retriever;
mod tool;


pub use retriever::MultiCollectionRetriever;
pub use tool::{AgentTool, RetrievalTool, ToolDescription};

// Re-export core types for convenience
pub use mcrag_core::{
    CollectionDescriptor, CollectionFailure, CollectionHits, CollectionOutcome,
    CollectionQueryClient, CollectionRegistry, Error, Passage, Query, Result, RetrievalResult,
};
