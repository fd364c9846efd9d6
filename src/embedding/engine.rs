// Sentence embeddings via a BERT-family encoder running on candle
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

use crate::embedding::Embedder;
use crate::errors::{GlowError, Result};

/// Default model: small, free, 384-dimensional
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
const DEFAULT_DIM: usize = 384;
const MAX_SEQUENCE_LEN: usize = 256;

/// Sentence embedder: mean-pooled, L2-normalised BERT outputs
pub struct SentenceEmbedder {
    model: Arc<BertModel>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
    model_id: String,
    dimension: usize,
}

impl SentenceEmbedder {
    /// Load the default model (downloads on first use)
    pub fn new() -> Result<Self> {
        Self::from_hub(DEFAULT_MODEL_ID)
    }

    /// Load any BERT-compatible sentence encoder from the HuggingFace Hub
    pub fn from_hub(model_id: &str) -> Result<Self> {
        // CPU only
        let device = Device::Cpu;

        let api = Api::new()
            .map_err(|e| embedding_error("Failed to create HuggingFace API client", e))?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .map_err(|e| embedding_error("Failed to download model config", e))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| embedding_error("Failed to download tokenizer", e))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| embedding_error("Failed to download model weights", e))?;

        let config_contents = std::fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| embedding_error("Failed to parse model config", e))?;
        let dimension = serde_json::from_str::<serde_json::Value>(&config_contents)
            .ok()
            .and_then(|v| v.get("hidden_size").and_then(|h| h.as_u64()))
            .map(|h| h as usize)
            .unwrap_or(DEFAULT_DIM);

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| embedding_error("Failed to load tokenizer", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LEN,
                ..Default::default()
            }))
            .map_err(|e| embedding_error("Failed to configure truncation", e))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(|e| embedding_error("Failed to load model weights", e))?
        };

        let model = BertModel::load(vb, &config)
            .map_err(|e| embedding_error("Failed to create BERT model", e))?;

        info!(model = model_id, dimension, "Sentence embedder ready");

        Ok(Self {
            model: Arc::new(model),
            tokenizer: Arc::new(tokenizer),
            device,
            model_id: model_id.to_string(),
            dimension,
        })
    }

    fn forward(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| embedding_error("Tokenization failed", e))?;

        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);
        let batch_size = texts.len();

        // Pad sequences
        let mut flat_ids = vec![0u32; batch_size * max_len];
        let mut flat_mask = vec![0u32; batch_size * max_len];
        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let row = i * max_len;
            flat_ids[row..row + ids.len()].copy_from_slice(ids);
            flat_mask[row..row + mask.len()].copy_from_slice(mask);
        }

        self.pooled(flat_ids, flat_mask, batch_size, max_len)
            .map_err(|e| embedding_error("Forward pass failed", e))
    }

    fn pooled(
        &self,
        flat_ids: Vec<u32>,
        flat_mask: Vec<u32>,
        batch_size: usize,
        max_len: usize,
    ) -> candle_core::Result<Vec<Vec<f32>>> {
        let token_ids = Tensor::from_vec(flat_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = token_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;

        // Mean pooling with attention mask
        let mask = attention_mask.to_dtype(hidden.dtype())?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
        let pooled = summed.broadcast_div(&counts)?;

        // L2 normalisation so dot product equals cosine similarity
        let norms = pooled.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12, f64::MAX)?;
        pooled.broadcast_div(&norms)?.to_vec2::<f32>()
    }
}

impl Embedder for SentenceEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.forward(texts)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn embedding_error(context: &str, err: impl std::fmt::Display) -> GlowError {
    GlowError::Embedding(format!("{}: {}", context, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_embedding_dimension() {
        let engine = SentenceEmbedder::new().expect("Failed to create engine");
        assert_eq!(engine.dimension(), 384);
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_embed_is_normalized() {
        let engine = SentenceEmbedder::new().expect("Failed to create engine");
        let embedding = engine.embed("moisturizing cream for dry skin").expect("Failed to embed");
        let norm: f32 = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_embed_batch_preserves_order() {
        let engine = SentenceEmbedder::new().expect("Failed to create engine");
        let texts = vec!["sunscreen", "night cream", "clay mask"];
        let batch = engine.embed_batch(&texts).expect("Failed to embed batch");
        let single = engine.embed("night cream").expect("Failed to embed");
        assert_eq!(batch.len(), 3);
        let dot: f32 = batch[1].iter().zip(&single).map(|(a, b)| a * b).sum();
        assert!(dot > 0.99);
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_embed_empty_batch() {
        let engine = SentenceEmbedder::new().expect("Failed to create engine");
        let embeddings = engine.embed_batch(&[]).expect("Failed to embed empty batch");
        assert!(embeddings.is_empty());
    }
}
