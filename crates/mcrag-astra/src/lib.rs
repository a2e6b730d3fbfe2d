//! Astra DB integration for MCRAG
//!
//! This crate provides the Astra DB REST implementation of the
//! `CollectionQueryClient` trait and the configuration it is built from.

mod client;
mod config;


pub use client::{AstraClient, DEFAULT_MAX_BODY_BYTES, DEFAULT_TIMEOUT};
pub use config::{AstraConfig, DEFAULT_COLLECTIONS, DEFAULT_NAMESPACE};

// Re-export core types for convenience
pub use mcrag_core::{
    CollectionDescriptor, CollectionFailure, CollectionHits, CollectionQueryClient,
    CollectionRegistry, Error, Passage, Result,
};
