//! Merged retrieval results

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{CollectionFailure, CollectionHits, Passage};

/// What happened to one collection during a retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CollectionOutcome {
    Success { passages: usize, skipped: usize },
    Failed { reason: CollectionFailure },
}

impl CollectionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CollectionOutcome::Success { .. })
    }
}

/// Passages merged across collections, plus one outcome per queried collection.
///
/// Both the passages and the outcome map follow registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub passages: Vec<Passage>,
    pub outcomes: IndexMap<String, CollectionOutcome>,
}

impl RetrievalResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one collection's settled query to the result
    pub fn record(&mut self, identifier: &str, outcome: Result<CollectionHits, CollectionFailure>) {
        let outcome = match outcome {
            Ok(hits) => {
                let entry = CollectionOutcome::Success {
                    passages: hits.passages.len(),
                    skipped: hits.skipped,
                };
                self.passages.extend(hits.passages);
                entry
            }
            Err(reason) => CollectionOutcome::Failed { reason },
        };
        self.outcomes.insert(identifier.to_string(), outcome);
    }

    /// True when every queried collection succeeded
    pub fn is_complete(&self) -> bool {
        self.outcomes.values().all(CollectionOutcome::is_success)
    }

    /// True when at least one queried collection failed
    pub fn is_degraded(&self) -> bool {
        !self.is_complete()
    }

    /// Failed collections with their reasons, in registry order
    pub fn failed_collections(&self) -> Vec<(&str, &CollectionFailure)> {
        self.outcomes
            .iter()
            .filter_map(|(id, outcome)| match outcome {
                CollectionOutcome::Failed { reason } => Some((id.as_str(), reason)),
                CollectionOutcome::Success { .. } => None,
            })
            .collect()
    }

    pub fn passages_from<'a>(&'a self, identifier: &'a str) -> impl Iterator<Item = &'a Passage> + 'a {
        self.passages
            .iter()
            .filter(move |p| p.source_collection == identifier)
    }

    /// Passage contents without collection attribution
    pub fn contents(&self) -> Vec<String> {
        self.passages.iter().map(|p| p.content.clone()).collect()
    }

    /// Render the passages as a numbered context block for a prompt
    pub fn context(&self) -> String {
        if self.passages.is_empty() {
            return String::new();
        }

        let mut context = String::from("Relevant passages:\n\n");
        for (i, passage) in self.passages.iter().enumerate() {
            context.push_str(&format!(
                "{}. [{}] {}\n\n",
                i + 1,
                passage.source_collection,
                passage.content
            ));
        }
        context
    }
}
