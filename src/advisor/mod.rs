//! Routine advisor
//!
//! `Advisor::bootstrap` is the one-time initialization step: it loads the
//! catalog, builds the index and the generation backend, and returns a handle
//! that can be shared across requests. Nothing is memoized behind it.

pub mod orchestrator;

pub use orchestrator::RoutineOrchestrator;

use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::catalog::load_catalog;
use crate::config::{Config, EmbeddingBackend};
use crate::embedding::{Embedder, HashingEmbedder, SentenceEmbedder};
use crate::errors::Result;
use crate::generation::{build_backend, GenerationBackend, StructuredGenerator};
use crate::rag::{CatalogIndex, ConstrainedRetriever, RAGPipeline, RetrievalQuery};
use crate::types::{ProductRecord, RoutineSet, UserProfile};

/// Fully initialized advisor: index, retriever and orchestrator
#[derive(Clone)]
pub struct Advisor {
    index: Arc<CatalogIndex>,
    retriever: ConstrainedRetriever,
    orchestrator: RoutineOrchestrator,
    top_k: usize,
}

impl Advisor {
    /// Build everything from configuration. Catalog, index and backend
    /// configuration errors are returned here and are fatal to the caller.
    pub fn bootstrap(config: &Config) -> Result<Self> {
        let embedder = build_embedder(config)?;
        let backend = build_backend(&config.generation)?;
        Self::from_parts(config, embedder, backend)
    }

    /// Same as [`Advisor::bootstrap`] with caller-supplied embedder and backend
    pub fn from_parts(
        config: &Config,
        embedder: Arc<dyn Embedder>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Result<Self> {
        let index = build_index(config, embedder)?;
        info!(backend = backend.name(), model = backend.model(), "Advisor ready");
        Ok(Self::with_index(config, index, backend))
    }

    /// Wire an advisor around an already built index
    pub fn with_index(
        config: &Config,
        index: Arc<CatalogIndex>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        let retriever =
            ConstrainedRetriever::with_overfetch(index.clone(), config.retrieval.overfetch_factor);
        let rag = RAGPipeline::with_config(retriever.clone(), config.retrieval.rag_config());
        let generator = StructuredGenerator::new(rag, backend);

        Self {
            index,
            retriever,
            orchestrator: RoutineOrchestrator::new(generator),
            top_k: config.retrieval.top_k,
        }
    }

    /// Constrained catalog search, outside of any generation run
    pub fn search(&self, text: &str, k: Option<usize>, avoid: &[String]) -> Result<Vec<ProductRecord>> {
        let query = RetrievalQuery::new(text, k.unwrap_or(self.top_k)).excluding(avoid.iter().cloned());
        self.retriever.search(&query)
    }

    /// Generate all three routines for a profile
    pub async fn generate_all(&self, profile: &UserProfile) -> RoutineSet {
        self.orchestrator.generate_all(profile).await
    }

    pub fn index(&self) -> &Arc<CatalogIndex> {
        &self.index
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackend> {
        self.orchestrator.generator().backend()
    }
}

/// Load the configured catalog and index it. Usable on its own for
/// retrieval without a generation backend.
pub fn build_index(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Arc<CatalogIndex>> {
    let start = Instant::now();
    let records = load_catalog(&config.catalog_path())?;
    let index = CatalogIndex::build(records, embedder)?;

    info!(
        products = index.len(),
        embedder = index.model_id(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Catalog indexed"
    );
    Ok(Arc::new(index))
}

/// Embedder selected in configuration
pub fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.embedding.backend {
        EmbeddingBackend::Candle => Arc::new(SentenceEmbedder::from_hub(&config.embedding.model_id)?),
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new()),
    };
    Ok(embedder)
}
