//! Error types for Glow
//!
//! One error enum for the whole pipeline. Startup errors (`IndexBuild`,
//! `Configuration`) are fatal; retrieval and generation errors are scoped to
//! the call that raised them and are absorbed by the generator.

use thiserror::Error;

/// Main error type for the Glow pipeline
#[derive(Error, Debug)]
pub enum GlowError {
    /// Catalog could not be loaded or indexed
    #[error("Index build failed: {0}")]
    IndexBuild(String),

    /// Similarity search failed for one query
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Embedding model errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Generation backend errors (transport, HTTP status, empty reply)
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Backend reply did not conform to the routine schema
    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation exceeded the configured request timeout
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Glow operations
pub type Result<T> = std::result::Result<T, GlowError>;

impl GlowError {
    /// Whether this error must abort startup rather than degrade a request
    pub fn is_fatal(&self) -> bool {
        matches!(self, GlowError::IndexBuild(_) | GlowError::Configuration(_))
    }
}
