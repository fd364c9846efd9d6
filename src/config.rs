//! Configuration management for Glow
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.glow/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::embedding::engine::DEFAULT_MODEL_ID;
use crate::errors::{GlowError, Result};
use crate::generation::mistral::{DEFAULT_MISTRAL_MODEL, DEFAULT_MISTRAL_URL};
use crate::generation::ollama::DEFAULT_OLLAMA_URL;
use crate::rag::retrieval::OVERFETCH_FACTOR;
use crate::rag::{ContextConfig, RAGConfig};

/// Complete configuration for Glow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub logging: LoggingConfig,
}

/// Product catalog location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: String,
}

/// Which vectoriser builds the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Sentence-transformer model run locally with candle
    Candle,
    /// Offline feature hashing, no model download
    Hashing,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    pub model_id: String,
}

/// Retrieval and evidence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub overfetch_factor: usize,
    pub max_context_tokens: usize,
}

/// Hosted or local generation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Mistral,
    Ollama,
}

/// Generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: Provider,
    pub model: String,
    /// Overrides the provider's default endpoint
    pub base_url: Option<String>,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    /// Environment variable holding the Mistral API key
    pub api_key_env: String,
}

/// Log filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when neither -v/-q nor RUST_LOG is given
    pub level: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "skincare_products.csv".to_string(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Candle,
            model_id: DEFAULT_MODEL_ID.to_string(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            overfetch_factor: OVERFETCH_FACTOR,
            max_context_tokens: 1000,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Mistral,
            model: DEFAULT_MISTRAL_MODEL.to_string(),
            base_url: None,
            temperature: 0.0,
            request_timeout_secs: 120,
            api_key_env: "MISTRAL_API_KEY".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl RetrievalConfig {
    /// Evidence pipeline settings derived from this section
    pub fn rag_config(&self) -> RAGConfig {
        RAGConfig {
            top_k: self.top_k,
            context: ContextConfig {
                max_context_tokens: self.max_context_tokens,
            },
        }
    }
}

impl GenerationConfig {
    /// Endpoint to call, falling back to the provider default
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => match self.provider {
                Provider::Mistral => DEFAULT_MISTRAL_URL.to_string(),
                Provider::Ollama => DEFAULT_OLLAMA_URL.to_string(),
            },
        }
    }

    /// Read the API key from the configured environment variable
    pub fn resolve_api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(GlowError::Configuration(format!(
                "{} is not set",
                self.api_key_env
            ))),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GlowError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| GlowError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// ~/.glow/config.toml, if a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".glow").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.catalog.path.trim().is_empty() {
            return Err(GlowError::Configuration(
                "catalog.path must not be empty".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(GlowError::Configuration(
                "top_k must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.overfetch_factor == 0 {
            return Err(GlowError::Configuration(
                "overfetch_factor must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.max_context_tokens == 0 {
            return Err(GlowError::Configuration(
                "max_context_tokens must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(GlowError::Configuration(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.generation.request_timeout_secs == 0 {
            return Err(GlowError::Configuration(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.generation.model.trim().is_empty() {
            return Err(GlowError::Configuration(
                "generation.model must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| GlowError::Configuration(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GlowError::Configuration(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| GlowError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Resolved catalog path
    pub fn catalog_path(&self) -> PathBuf {
        Self::expand_path(&self.catalog.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.overfetch_factor, 4);
        assert_eq!(config.generation.provider, Provider::Mistral);
        assert_eq!(config.generation.model, "mistral-large-latest");
        assert_eq!(config.generation.temperature, 0.0);
        assert_eq!(config.embedding.model_id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_top_k() {
        let mut config = Config::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_overfetch() {
        let mut config = Config::default();
        config.retrieval.overfetch_factor = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_temperature() {
        let mut config = Config::default();
        config.generation.temperature = 3.5;
        assert!(matches!(
            config.validate(),
            Err(GlowError::Configuration(_))
        ));
    }

    #[test]
    fn test_base_url_per_provider() {
        let mut generation = GenerationConfig::default();
        assert_eq!(generation.base_url(), "https://api.mistral.ai");

        generation.provider = Provider::Ollama;
        assert_eq!(generation.base_url(), "http://127.0.0.1:11434");

        generation.base_url = Some("http://gpu-box:11434".to_string());
        assert_eq!(generation.base_url(), "http://gpu-box:11434");
    }

    #[test]
    fn test_missing_api_key() {
        let generation = GenerationConfig {
            api_key_env: "GLOW_CONFIG_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            generation.resolve_api_key(),
            Err(GlowError::Configuration(_))
        ));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[generation]\nprovider = \"ollama\"\nmodel = \"llama3.1\"\n\n[embedding]\nbackend = \"hashing\"\n",
        )
        .unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.generation.provider, Provider::Ollama);
        assert_eq!(config.generation.model, "llama3.1");
        assert_eq!(config.embedding.backend, EmbeddingBackend::Hashing);
        assert_eq!(config.retrieval.top_k, 5);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retrieval]\ntop_k = 0\n").unwrap();
        assert!(Config::load(Some(path)).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.retrieval.overfetch_factor = 6;
        config.save(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.retrieval.overfetch_factor, 6);
    }

    #[test]
    fn test_rag_config_mapping() {
        let retrieval = RetrievalConfig {
            top_k: 3,
            overfetch_factor: 4,
            max_context_tokens: 200,
        };
        let rag = retrieval.rag_config();
        assert_eq!(rag.top_k, 3);
        assert_eq!(rag.context.max_context_tokens, 200);
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let expanded = Config::expand_path("/absolute/path");
        assert_eq!(expanded.to_string_lossy(), "/absolute/path");
    }
}
