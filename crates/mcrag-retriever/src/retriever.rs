//! Concurrent fan-out over registered collections

use futures::future::join_all;
use std::future::{Future, pending};
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinHandle};

use mcrag_core::{
    CollectionDescriptor, CollectionFailure, CollectionHits, CollectionQueryClient,
    CollectionRegistry, Error, Query, Result, RetrievalResult,
};

/// Queries every collection of a registry concurrently and merges the results.
///
/// Each collection runs in its own task; a failure, timeout or panic in one
/// task is recorded against that collection and never affects the others.
/// Merged passages follow registry order regardless of completion order.
pub struct MultiCollectionRetriever<C: CollectionQueryClient + 'static> {
    registry: Arc<CollectionRegistry>,
    client: Arc<C>,
}

impl<C: CollectionQueryClient + 'static> Clone for MultiCollectionRetriever<C> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            client: Arc::clone(&self.client),
        }
    }
}

/// Aborts the wrapped tasks when dropped
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

impl<C: CollectionQueryClient + 'static> MultiCollectionRetriever<C> {
    pub fn new(registry: CollectionRegistry, client: C) -> Self {
        Self::with_shared_client(registry, Arc::new(client))
    }

    pub fn with_shared_client(registry: CollectionRegistry, client: Arc<C>) -> Self {
        Self {
            registry: Arc::new(registry),
            client,
        }
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    /// A retriever over a single registered collection, sharing this client
    pub fn scoped(&self, identifier: &str) -> Result<Self> {
        Ok(Self {
            registry: Arc::new(self.registry.subset(&[identifier])?),
            client: Arc::clone(&self.client),
        })
    }

    /// Retrieve passages from every registered collection
    pub async fn retrieve(&self, query: &Query) -> Result<RetrievalResult> {
        self.retrieve_with_cancel(query, pending()).await
    }

    /// Retrieve passages from one registered collection
    pub async fn retrieve_from(&self, identifier: &str, query: &Query) -> Result<RetrievalResult> {
        query.validate()?;
        self.scoped(identifier)?.retrieve(query).await
    }

    /// Retrieve, giving up with [`Error::Cancelled`] as soon as `cancel` resolves.
    ///
    /// In-flight collection queries are aborted on cancellation and nothing
    /// they produced is returned.
    pub async fn retrieve_with_cancel<F>(&self, query: &Query, cancel: F) -> Result<RetrievalResult>
    where
        F: Future<Output = ()>,
    {
        query.validate()?;

        let descriptors = self.registry.list();
        let tasks: Vec<_> = descriptors
            .iter()
            .map(|descriptor| self.spawn_query(descriptor, query))
            .collect();
        let _guard = AbortOnDrop(tasks.iter().map(|task| task.abort_handle()).collect());

        let settled = tokio::select! {
            settled = join_all(tasks) => settled,
            _ = cancel => {
                log::debug!(
                    "Retrieval cancelled with {} collection queries in flight",
                    descriptors.len()
                );
                return Err(Error::Cancelled);
            }
        };

        let mut result = RetrievalResult::new();
        for (descriptor, joined) in descriptors.iter().zip(settled) {
            let identifier = descriptor.identifier();
            let outcome = match joined {
                Ok(Ok(mut hits)) => {
                    hits.passages.truncate(query.top_k);
                    for passage in &mut hits.passages {
                        if passage.source_collection != identifier {
                            passage.source_collection = identifier.to_string();
                        }
                    }
                    log::debug!(
                        "Collection '{}': {} passage(s), {} skipped",
                        identifier,
                        hits.passages.len(),
                        hits.skipped
                    );
                    Ok(hits)
                }
                Ok(Err(failure)) => {
                    log::warn!("Collection '{}' failed: {}", identifier, failure);
                    Err(failure)
                }
                Err(e) => {
                    log::warn!("Collection '{}' query task failed: {}", identifier, e);
                    Err(CollectionFailure::Task {
                        message: e.to_string(),
                    })
                }
            };
            result.record(identifier, outcome);
        }

        if result.is_degraded() {
            log::warn!(
                "Degraded retrieval: {} of {} collections failed",
                result.failed_collections().len(),
                result.outcomes.len()
            );
        }

        Ok(result)
    }

    fn spawn_query(
        &self,
        descriptor: &CollectionDescriptor,
        query: &Query,
    ) -> JoinHandle<std::result::Result<CollectionHits, CollectionFailure>> {
        let client = Arc::clone(&self.client);
        let descriptor = descriptor.clone();
        let text = query.text.clone();
        let top_k = query.top_k;

        log::debug!("Querying collection '{}' (top_k={})", descriptor.identifier(), top_k);
        tokio::spawn(async move { client.query(&descriptor, &text, top_k).await })
    }
}
