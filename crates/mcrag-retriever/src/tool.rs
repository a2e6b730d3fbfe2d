//! Agent tool adapter over the retriever

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use mcrag_core::{CollectionQueryClient, DEFAULT_TOP_K, Error, Query, Result};

use crate::MultiCollectionRetriever;

/// Name, description and JSON-schema parameters an agent framework shows its model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Trait for tools callable by an agent framework with JSON arguments
#[async_trait]
pub trait AgentTool: Send + Sync {
    fn description(&self) -> &ToolDescription;

    /// Run the tool on the model-provided arguments
    async fn call(&self, args: Value) -> Result<Value>;
}

/// Exposes a retriever as a plain `query text -> passages` function.
///
/// Collection failures never surface here: a fully failed retrieval is an
/// empty passage list, so the agent can continue without context.
pub struct RetrievalTool<C: CollectionQueryClient + 'static> {
    retriever: MultiCollectionRetriever<C>,
    desc: ToolDescription,
    top_k: usize,
}

fn query_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The input query to search for relevant passages."
            }
        },
        "required": ["query"]
    })
}

impl<C: CollectionQueryClient + 'static> RetrievalTool<C> {
    /// One tool over every registered collection
    pub fn new(retriever: MultiCollectionRetriever<C>) -> Self {
        let desc = ToolDescription {
            name: "astradb_multi_collection".to_string(),
            description: format!(
                "Query the {} collections in AstraDB and return the merged passages.",
                retriever.registry().identifiers().join(", ")
            ),
            parameters: query_parameters(),
        };

        Self {
            retriever,
            desc,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// One tool per registered collection, in registry order
    pub fn per_collection(retriever: &MultiCollectionRetriever<C>) -> Result<Vec<Self>> {
        retriever
            .registry()
            .identifiers()
            .into_iter()
            .map(|identifier| -> Result<Self> {
                Ok(Self {
                    retriever: retriever.scoped(identifier)?,
                    desc: ToolDescription {
                        name: format!("astradb_{}", identifier),
                        description: format!("Query the {} collection in AstraDB.", identifier),
                        parameters: query_parameters(),
                    },
                    top_k: DEFAULT_TOP_K,
                })
            })
            .collect()
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn parameters(&self) -> &Value {
        &self.desc.parameters
    }

    /// Retrieve passage contents for `query_text`
    pub async fn retrieve(&self, query_text: &str) -> Result<Vec<String>> {
        let query = Query::new(query_text).with_top_k(self.top_k);
        let result = self.retriever.retrieve(&query).await?;
        Ok(result.contents())
    }
}

#[async_trait]
impl<C: CollectionQueryClient + 'static> AgentTool for RetrievalTool<C> {
    fn description(&self) -> &ToolDescription {
        &self.desc
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let query_text = args
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidQuery("missing string argument 'query'".to_string()))?;

        Ok(serde_json::to_value(self.retrieve(query_text).await?)?)
    }
}
