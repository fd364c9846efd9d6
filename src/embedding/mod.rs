//! Text embedding
//!
//! The catalog index and the retriever only see the [`Embedder`] trait.
//! Two implementations ship with the crate:
//! - [`SentenceEmbedder`]: MiniLM sentence encoder run locally through candle
//! - [`HashingEmbedder`]: deterministic feature hashing, no model download

pub mod engine;
pub mod hashing;

pub use engine::SentenceEmbedder;
pub use hashing::HashingEmbedder;

use crate::errors::{GlowError, Result};

/// Turns text into fixed-length vectors comparable by cosine similarity
pub trait Embedder: Send + Sync {
    /// Embed several texts; output order matches input order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| GlowError::Embedding("Embedder returned an empty batch".to_string()))
    }

    /// Vector length produced by this embedder
    fn dimension(&self) -> usize;

    /// Identifier of the underlying model, for logs
    fn model_id(&self) -> &str;
}

/// Scale `vector` to unit length in place. Zero vectors are left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
