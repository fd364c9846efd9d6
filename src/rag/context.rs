// Evidence block composition for generation prompts
use serde::{Deserialize, Serialize};

use crate::types::ProductRecord;

/// Context composition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum tokens for the evidence block
    pub max_context_tokens: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: 1000,
        }
    }
}

/// Renders retrieved products as one line each: `name (category) - price`
#[derive(Debug, Clone, Default)]
pub struct ContextComposer {
    config: ContextConfig,
}

impl ContextComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Compose the evidence block. Empty input gives an empty string.
    pub fn compose(&self, results: &[ProductRecord]) -> String {
        let mut lines = Vec::with_capacity(results.len());
        let mut total_tokens = 0;

        for product in results {
            let line = Self::format_line(product);

            // Rough estimate: ~4 chars per token
            let line_tokens = line.len().div_ceil(4);
            if total_tokens + line_tokens > self.config.max_context_tokens {
                break;
            }

            total_tokens += line_tokens;
            lines.push(line);
        }

        lines.join("\n")
    }

    fn format_line(product: &ProductRecord) -> String {
        format!("{} ({}) - {}", product.name, product.category, product.price)
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }
}
