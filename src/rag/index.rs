// Catalog index: exact cosine nearest-neighbour search over product descriptions
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::embedding::{normalize, Embedder};
use crate::errors::{GlowError, Result};
use crate::types::ProductRecord;

/// Texts embedded per batch while building
const BUILD_BATCH_SIZE: usize = 32;

/// Search seam used by the retriever
pub trait ProductIndex: Send + Sync {
    /// Embed query text with the same model the index was built with
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Up to `k` products ranked by descending similarity to `vector`
    fn nearest(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredProduct>>;
}

/// A product with its similarity to a query
#[derive(Debug, Clone, Serialize)]
pub struct ScoredProduct {
    pub product: ProductRecord,
    pub score: f32,
}

/// Indexed catalog entry
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub record: ProductRecord,
    pub text: String,
    pub vector: Vec<f32>,
}

/// In-memory catalog index. Built once, then read-only.
pub struct CatalogIndex {
    documents: Vec<IndexedDocument>,
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for CatalogIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogIndex")
            .field("documents", &self.documents.len())
            .field("model", &self.embedder.model_id())
            .finish()
    }
}

impl CatalogIndex {
    /// Embed every record and build the index
    pub fn build(records: Vec<ProductRecord>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if records.is_empty() {
            return Err(GlowError::IndexBuild(
                "Cannot build an index from an empty catalog".to_string(),
            ));
        }

        let start = Instant::now();
        let texts: Vec<String> = records.iter().map(|r| r.descriptive_text()).collect();

        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(BUILD_BATCH_SIZE) {
            let batch: Vec<&str> = chunk.iter().map(String::as_str).collect();
            let embedded = embedder
                .embed_batch(&batch)
                .map_err(|e| GlowError::IndexBuild(format!("Failed to embed catalog: {}", e)))?;
            if embedded.len() != batch.len() {
                return Err(GlowError::IndexBuild(format!(
                    "Embedder returned {} vectors for {} texts",
                    embedded.len(),
                    batch.len()
                )));
            }
            vectors.extend(embedded);
        }

        let documents = records
            .into_iter()
            .zip(texts)
            .zip(vectors)
            .map(|((record, text), mut vector)| {
                normalize(&mut vector);
                IndexedDocument { record, text, vector }
            })
            .collect::<Vec<_>>();

        info!(
            products = documents.len(),
            model = embedder.model_id(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Catalog index built"
        );

        Ok(Self { documents, embedder })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[IndexedDocument] {
        &self.documents
    }

    pub fn model_id(&self) -> &str {
        self.embedder.model_id()
    }
}

impl ProductIndex for CatalogIndex {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = self.embedder.embed(text)?;
        normalize(&mut vector);
        Ok(vector)
    }

    fn nearest(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredProduct>> {
        if let Some(doc) = self.documents.first() {
            if doc.vector.len() != vector.len() {
                return Err(GlowError::Retrieval(format!(
                    "Query vector has {} dimensions, index has {}",
                    vector.len(),
                    doc.vector.len()
                )));
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (i, cosine(&doc.vector, vector)))
            .collect();

        // Stable sort keeps catalog order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredProduct {
                product: self.documents[i].record.clone(),
                score,
            })
            .collect())
    }
}

/// Cosine similarity; zero when either side is a zero vector
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
