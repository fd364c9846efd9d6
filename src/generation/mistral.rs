//! Mistral chat-completions backend
//!
//! - Endpoint: POST /v1/chat/completions, bearer auth
//! - Structured output via `response_format: json_schema` in strict mode

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::errors::{GlowError, Result};
use crate::generation::backend::{http_client, transport_error, GenerationBackend};
use crate::generation::schema::SCHEMA_NAME;

/// Default Mistral API endpoint
pub const DEFAULT_MISTRAL_URL: &str = "https://api.mistral.ai";

/// Default hosted model
pub const DEFAULT_MISTRAL_MODEL: &str = "mistral-large-latest";

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Mistral backend
#[derive(Clone)]
pub struct MistralBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    timeout: Duration,
}

impl std::fmt::Debug for MistralBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MistralBackend")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl MistralBackend {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(GlowError::Configuration("Mistral API key is empty".to_string()));
        }

        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            temperature,
            timeout,
        })
    }

    fn request_body(&self, prompt: &str, schema: &Value) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": SCHEMA_NAME,
                    "schema": schema,
                    "strict": true
                }
            }
        })
    }
}

#[async_trait]
impl GenerationBackend for MistralBackend {
    fn name(&self) -> &str {
        "mistral"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete_structured(&self, prompt: &str, schema: &Value) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt, schema))
            .send()
            .await
            .map_err(|e| transport_error("Mistral", self.timeout, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GlowError::Generation(format!(
                "Mistral HTTP {}: {}",
                status, error_text
            )));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GlowError::Generation(format!("Failed to parse Mistral response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GlowError::Generation("Mistral returned no choices".to_string()))?;

        debug!(model = %self.model, chars = content.len(), "Mistral reply received");
        Ok(content)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/v1/models", self.base_url);

        match self.client.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MistralBackend {
        MistralBackend::new(
            DEFAULT_MISTRAL_URL,
            DEFAULT_MISTRAL_MODEL,
            "test-key",
            0.0,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = MistralBackend::new(DEFAULT_MISTRAL_URL, "m", "  ", 0.0, Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, GlowError::Configuration(_)));
    }

    #[test]
    fn test_request_body_carries_schema() {
        let schema = json!({"type": "object"});
        let body = backend().request_body("prompt", &schema);
        assert_eq!(body["model"], DEFAULT_MISTRAL_MODEL);
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], SCHEMA_NAME);
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(body["messages"][0]["content"], "prompt");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let debug = format!("{:?}", backend());
        assert!(!debug.contains("test-key"));
    }
}
