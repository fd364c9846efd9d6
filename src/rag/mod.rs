// RAG (Retrieval-Augmented Generation) over the product catalog
//
// Components:
// - Index: exact cosine search over embedded product descriptions
// - Retrieval: over-fetch + ingredient exclusion filter
// - Context: evidence block for generation prompts
// - Pipeline: retrieval and composition for one generation call

pub mod index;
pub mod retrieval;
pub mod context;
pub mod pipeline;

// Re-export key types
pub use index::{CatalogIndex, IndexedDocument, ProductIndex, ScoredProduct};
pub use retrieval::{ConstrainedRetriever, RetrievalQuery, OVERFETCH_FACTOR};
pub use context::{ContextComposer, ContextConfig};
pub use pipeline::{Evidence, RAGConfig, RAGPipeline};
