//! Collection descriptors and the registry that owns them

use serde::Serialize;
use std::fmt;
use url::Url;

use crate::{Error, Result};

/// Connection parameters for one remote collection.
///
/// Descriptors are validated on construction and immutable afterwards, so a
/// value of this type always carries a non-empty identifier and an absolute
/// `http`/`https` endpoint.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CollectionDescriptor {
    identifier: String,
    endpoint: Url,
    #[serde(skip_serializing)]
    credential: String,
}

impl CollectionDescriptor {
    /// Create a validated descriptor
    pub fn new(
        identifier: impl Into<String>,
        endpoint: &str,
        credential: impl Into<String>,
    ) -> Result<Self> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(Error::InvalidDescriptor(
                "collection identifier is empty".to_string(),
            ));
        }

        let endpoint = Url::parse(endpoint).map_err(|e| {
            Error::InvalidDescriptor(format!(
                "endpoint '{}' for collection '{}' is not an absolute URL: {}",
                endpoint, identifier, e
            ))
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.host_str().is_none() {
            return Err(Error::InvalidDescriptor(format!(
                "endpoint '{}' for collection '{}' must be an http(s) URL with a host",
                endpoint, identifier
            )));
        }

        Ok(Self {
            identifier,
            endpoint,
            credential: credential.into(),
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }
}

impl fmt::Debug for CollectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionDescriptor")
            .field("identifier", &self.identifier)
            .field("endpoint", &self.endpoint.as_str())
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Ordered set of collections queried by a single retrieval session.
///
/// Registration order is significant: it is the merge order of retrieved
/// passages.
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    descriptors: Vec<CollectionDescriptor>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from descriptors, in iteration order
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = CollectionDescriptor>,
    ) -> Result<Self> {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Register a collection. Leaves the registry untouched on failure.
    pub fn register(&mut self, descriptor: CollectionDescriptor) -> Result<()> {
        if self.contains(descriptor.identifier()) {
            return Err(Error::DuplicateCollection(descriptor.identifier.clone()));
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Descriptors in registration order
    pub fn list(&self) -> &[CollectionDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, identifier: &str) -> Option<&CollectionDescriptor> {
        self.descriptors.iter().find(|d| d.identifier == identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    /// Identifiers in registration order
    pub fn identifiers(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.identifier()).collect()
    }

    /// Restrict the registry to the named collections.
    ///
    /// The result keeps this registry's order, not the order of `identifiers`.
    pub fn subset<S: AsRef<str>>(&self, identifiers: &[S]) -> Result<Self> {
        if let Some(unknown) = identifiers.iter().find(|id| !self.contains(id.as_ref())) {
            return Err(Error::UnknownCollection(unknown.as_ref().to_string()));
        }

        let descriptors = self
            .descriptors
            .iter()
            .filter(|d| identifiers.iter().any(|id| id.as_ref() == d.identifier))
            .cloned()
            .collect();

        Ok(Self { descriptors })
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
