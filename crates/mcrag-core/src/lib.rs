//! Core traits and types for MCRAG (Multi-Collection RAG)
//!
//! This crate defines the fundamental types shared by the retrieval stack:
//! collection descriptors and their registry, queries and passages, the
//! per-collection outcome record, and the `CollectionQueryClient` trait that
//! remote vector-search backends implement.

pub mod client;
pub mod error;
pub mod query;
pub mod registry;
pub mod result;

pub use client::{CollectionFailure, CollectionHits, CollectionQueryClient};
pub use error::{Error, Result};
pub use query::{DEFAULT_TOP_K, Passage, Query};
pub use registry::{CollectionDescriptor, CollectionRegistry};
pub use result::{CollectionOutcome, RetrievalResult};
