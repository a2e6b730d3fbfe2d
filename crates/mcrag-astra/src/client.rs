//! Astra DB vector-search client implementation

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use mcrag_core::{
    CollectionDescriptor, CollectionFailure, CollectionHits, CollectionQueryClient, Error,
    Passage, Result,
};

use crate::config::{AstraConfig, DEFAULT_NAMESPACE};

/// Per-call time bound used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest success body accepted when none is configured
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Longest error body kept in a `Remote` failure
const BODY_SNIPPET_CHARS: usize = 200;

/// Astra DB REST client, shared by every collection of a registry
#[derive(Debug, Clone)]
pub struct AstraClient {
    client: Client,
    namespace: String,
    timeout: Duration,
    max_body_bytes: usize,
}

#[derive(Serialize)]
struct VectorSearchRequest<'a> {
    query: &'a str,
    #[serde(rename = "topK")]
    top_k: usize,
}

impl AstraClient {
    /// Create a client for the default namespace
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            client,
            namespace: DEFAULT_NAMESPACE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// Create a client from configuration
    pub fn from_config(config: &AstraConfig) -> Result<Self> {
        Ok(Self::new()?
            .with_namespace(config.namespace.clone())
            .with_timeout(config.timeout()))
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Cap the size of a response body; larger bodies fail as malformed
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// `{endpoint}/api/rest/v2/namespaces/{namespace}/collections/{collection}/vector-search`
    pub fn search_url(&self, descriptor: &CollectionDescriptor) -> std::result::Result<Url, CollectionFailure> {
        let mut url = descriptor.endpoint().clone();
        url.path_segments_mut()
            .map_err(|_| CollectionFailure::Transport {
                message: format!("endpoint '{}' cannot be a base URL", descriptor.endpoint()),
            })?
            .pop_if_empty()
            .extend([
                "api",
                "rest",
                "v2",
                "namespaces",
                self.namespace.as_str(),
                "collections",
                descriptor.identifier(),
                "vector-search",
            ]);
        Ok(url)
    }

    /// Perform the actual search request
    async fn perform_query(
        &self,
        descriptor: &CollectionDescriptor,
        query_text: &str,
        top_k: usize,
    ) -> std::result::Result<CollectionHits, CollectionFailure> {
        let url = self.search_url(descriptor)?;

        let mut response = self
            .client
            .post(url)
            .header("x-cassandra-token", descriptor.credential())
            .header("Content-Type", "application/json")
            .json(&VectorSearchRequest {
                query: query_text,
                top_k,
            })
            .send()
            .await
            .map_err(|e| CollectionFailure::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectionFailure::Remote {
                status_code: status.as_u16(),
                body: error_snippet(&mut response).await,
            });
        }

        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes as u64 {
                return Err(body_too_large(self.max_body_bytes));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| CollectionFailure::Transport {
            message: e.to_string(),
        })? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(body_too_large(self.max_body_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        let json: Value = serde_json::from_slice(&body).map_err(|e| CollectionFailure::Malformed {
            message: e.to_string(),
        })?;

        let hits = parse_documents(descriptor.identifier(), &json, top_k);
        if hits.skipped > 0 {
            log::warn!(
                "Collection '{}': skipped {} document(s) without document.content",
                descriptor.identifier(),
                hits.skipped
            );
        }

        Ok(hits)
    }
}

/// Best-effort start of an error body; read failures keep what arrived
async fn error_snippet(response: &mut Response) -> String {
    let limit = BODY_SNIPPET_CHARS * 4;
    let mut body = Vec::new();
    while body.len() < limit {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            Ok(None) | Err(_) => break,
        }
    }
    String::from_utf8_lossy(&body)
        .chars()
        .take(BODY_SNIPPET_CHARS)
        .collect()
}

fn body_too_large(limit: usize) -> CollectionFailure {
    CollectionFailure::Malformed {
        message: format!("response body exceeds {} bytes", limit),
    }
}

/// Extract passages from a vector-search response body.
///
/// A missing `documents` array yields no passages. Elements without a string
/// `document.content` are skipped and counted; at most `top_k` passages are kept.
pub(crate) fn parse_documents(collection: &str, body: &Value, top_k: usize) -> CollectionHits {
    let documents = body
        .get("documents")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut hits = CollectionHits::default();
    for hit in documents {
        match hit
            .get("document")
            .and_then(|d| d.get("content"))
            .and_then(Value::as_str)
        {
            Some(content) => hits.passages.push(Passage::new(collection, content)),
            None => hits.skipped += 1,
        }
    }
    hits.passages.truncate(top_k);
    hits
}

#[async_trait]
impl CollectionQueryClient for AstraClient {
    async fn query(
        &self,
        descriptor: &CollectionDescriptor,
        query_text: &str,
        top_k: usize,
    ) -> std::result::Result<CollectionHits, CollectionFailure> {
        let search_future = self.perform_query(descriptor, query_text, top_k);

        match timeout(self.timeout, search_future).await {
            Ok(result) => result,
            Err(_) => Err(CollectionFailure::timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(endpoint: &str) -> CollectionDescriptor {
        CollectionDescriptor::new("starry_night_faq", endpoint, "AstraCS:token").unwrap()
    }

    #[test]
    fn test_search_url() {
        let client = AstraClient::new().unwrap();
        let url = client
            .search_url(&descriptor("https://db-1.apps.astra.datastax.com"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://db-1.apps.astra.datastax.com/api/rest/v2/namespaces/default/collections/starry_night_faq/vector-search"
        );
    }

    #[test]
    fn test_search_url_keeps_endpoint_path() {
        let client = AstraClient::new().unwrap().with_namespace("astro");
        let url = client
            .search_url(&descriptor("http://localhost:8181/proxy/"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8181/proxy/api/rest/v2/namespaces/astro/collections/starry_night_faq/vector-search"
        );
    }

    #[test]
    fn test_parse_skips_documents_without_content() {
        let body = json!({
            "documents": [
                {"document": {"content": "Use the 25mm eyepiece first", "page": 3}},
                {"document": {"title": "no content here"}},
                {"score": 0.4},
                {"document": {"content": 42}},
                {"document": {"content": "Align the finder scope in daylight"}}
            ]
        });

        let hits = parse_documents("celestron_pdfs", &body, 5);
        assert_eq!(hits.skipped, 3);
        assert_eq!(
            hits.passages,
            vec![
                Passage::new("celestron_pdfs", "Use the 25mm eyepiece first"),
                Passage::new("celestron_pdfs", "Align the finder scope in daylight"),
            ]
        );
    }

    #[test]
    fn test_parse_caps_at_top_k() {
        let documents: Vec<Value> = (0..8)
            .map(|i| json!({"document": {"content": format!("passage {}", i)}}))
            .collect();

        let hits = parse_documents("YouTube", &json!({ "documents": documents }), 3);
        assert_eq!(hits.passages.len(), 3);
        assert_eq!(hits.passages[2].content, "passage 2");
    }

    #[test]
    fn test_parse_without_documents_is_empty() {
        let hits = parse_documents("YouTube", &json!({"status": "ok"}), 5);
        assert!(hits.passages.is_empty());
        assert_eq!(hits.skipped, 0);

        let hits = parse_documents("YouTube", &json!({"documents": "oops"}), 5);
        assert!(hits.passages.is_empty());
    }
}
