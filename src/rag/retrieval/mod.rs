// Constrained retrieval module
pub mod engine;

pub use engine::{ConstrainedRetriever, RetrievalQuery, OVERFETCH_FACTOR};
