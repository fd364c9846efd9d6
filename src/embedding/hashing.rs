//! Feature-hashing embedder
//!
//! Maps each lowercase alphanumeric token to a bucket with FNV-1a and counts
//! occurrences, then normalises. Lexical rather than semantic, but stable
//! across runs and platforms, which makes it the offline and test backend.

use crate::embedding::{normalize, Embedder};
use crate::errors::Result;

pub const DEFAULT_HASHING_DIM: usize = 384;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_HASHING_DIM)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let hash = token.bytes().fold(FNV_OFFSET, |acc, b| {
            (acc ^ u64::from(b)).wrapping_mul(FNV_PRIME)
        });
        (hash % self.dimension as u64) as usize
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            vector[self.bucket(token)] += 1.0;
        }
        normalize(&mut vector);
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashingEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        "feature-hashing"
    }
}
