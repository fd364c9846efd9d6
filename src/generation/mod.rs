//! Routine generation
//!
//! Prompt building, the backend seam, the two HTTP backends, and strict
//! validation of the structured reply against the routine schema.

pub mod backend;
pub mod generator;
pub mod mistral;
pub mod ollama;
pub mod prompt;
pub mod schema;

pub use backend::{build_backend, GenerationBackend};
pub use generator::StructuredGenerator;
pub use mistral::MistralBackend;
pub use ollama::OllamaBackend;
pub use prompt::{build_prompt, retrieval_query, slot_keywords};
pub use schema::{extract_json_object, parse_routine, routine_schema, validate_routine};
