// Evidence pipeline: retrieve -> compose, degrading to empty evidence on retrieval failure
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::rag::context::{ContextComposer, ContextConfig};
use crate::rag::retrieval::{ConstrainedRetriever, RetrievalQuery};
use crate::types::ProductRecord;

/// Evidence pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGConfig {
    /// Products retrieved per slot
    pub top_k: usize,
    /// Evidence block bounds
    pub context: ContextConfig,
}

impl Default for RAGConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            context: ContextConfig::default(),
        }
    }
}

/// Evidence gathered for one generation call
#[derive(Debug, Clone, Default, Serialize)]
pub struct Evidence {
    pub query: String,
    pub products: Vec<ProductRecord>,
    /// Composed block; empty when nothing was retrieved
    pub block: String,
    /// Set when retrieval failed and the block is empty for that reason
    pub retrieval_error: Option<String>,
}

impl Evidence {
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }
}

/// Retrieval plus composition
#[derive(Clone)]
pub struct RAGPipeline {
    retriever: ConstrainedRetriever,
    composer: ContextComposer,
    config: RAGConfig,
}

impl RAGPipeline {
    pub fn new(retriever: ConstrainedRetriever) -> Self {
        Self::with_config(retriever, RAGConfig::default())
    }

    pub fn with_config(retriever: ConstrainedRetriever, config: RAGConfig) -> Self {
        Self {
            retriever,
            composer: ContextComposer::with_config(config.context.clone()),
            config,
        }
    }

    /// Retrieve and compose. Never fails: a retrieval error yields empty
    /// evidence so generation can fall back to general knowledge.
    pub fn gather(&self, query_text: &str, exclusions: &[String]) -> Evidence {
        let query = RetrievalQuery::new(query_text, self.config.top_k)
            .excluding(exclusions.iter().cloned());

        match self.retriever.search(&query) {
            Ok(products) => {
                let block = self.composer.compose(&products);
                debug!(query = query_text, products = products.len(), "Evidence gathered");
                Evidence {
                    query: query_text.to_string(),
                    products,
                    block,
                    retrieval_error: None,
                }
            }
            Err(e) => {
                warn!(query = query_text, error = %e, "Retrieval failed, continuing without evidence");
                Evidence {
                    query: query_text.to_string(),
                    retrieval_error: Some(e.to_string()),
                    ..Default::default()
                }
            }
        }
    }

    pub fn config(&self) -> &RAGConfig {
        &self.config
    }
}
