//! Generation backend seam
//!
//! A backend takes a prompt plus a JSON Schema and returns the raw reply
//! text. Parsing and validation happen in the generator, so every backend is
//! held to the same schema rules.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{GenerationConfig, Provider};
use crate::errors::{GlowError, Result};
use crate::generation::mistral::MistralBackend;
use crate::generation::ollama::OllamaBackend;

/// Schema-constrained text completion service
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Provider name, for logs
    fn name(&self) -> &str;

    /// Model used for completions
    fn model(&self) -> &str;

    /// Complete `prompt`, asking the service to conform to `schema`
    async fn complete_structured(&self, prompt: &str, schema: &Value) -> Result<String>;

    /// Whether the service is reachable with the configured credentials
    async fn health_check(&self) -> Result<bool>;
}

/// Build the backend selected in configuration
pub fn build_backend(config: &GenerationConfig) -> Result<Arc<dyn GenerationBackend>> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let backend: Arc<dyn GenerationBackend> = match config.provider {
        Provider::Mistral => {
            let api_key = config.resolve_api_key()?;
            Arc::new(MistralBackend::new(
                &config.base_url(),
                &config.model,
                &api_key,
                config.temperature,
                timeout,
            )?)
        }
        Provider::Ollama => Arc::new(OllamaBackend::new(
            &config.base_url(),
            &config.model,
            config.temperature,
            timeout,
        )?),
    };
    Ok(backend)
}

/// Map a transport error, keeping timeouts distinct
pub(crate) fn transport_error(provider: &str, timeout: Duration, err: reqwest::Error) -> GlowError {
    if err.is_timeout() {
        GlowError::Timeout {
            duration_ms: timeout.as_millis() as u64,
        }
    } else {
        GlowError::Generation(format!("Failed to reach {}: {}", provider, err))
    }
}

/// Build the shared HTTP client for a backend
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GlowError::Configuration(format!("Failed to build HTTP client: {}", e)))
}
