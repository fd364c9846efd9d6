// Structured generator: one schema-constrained call per routine slot
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::errors::Result;
use crate::generation::backend::GenerationBackend;
use crate::generation::prompt::{build_prompt, retrieval_query};
use crate::generation::schema::{parse_routine, routine_schema};
use crate::rag::RAGPipeline;
use crate::types::{Routine, RoutineKind, SlotFailure, SlotOutcome, UserProfile};

/// Generates one validated routine per call. Failures stay inside the slot.
#[derive(Clone)]
pub struct StructuredGenerator {
    rag: RAGPipeline,
    backend: Arc<dyn GenerationBackend>,
    schema: Value,
}

impl StructuredGenerator {
    pub fn new(rag: RAGPipeline, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            rag,
            backend,
            schema: routine_schema(),
        }
    }

    /// Generate the routine for `kind`. Backend, timeout and schema errors
    /// become a [`SlotFailure`]; there is no retry.
    pub async fn generate(&self, profile: &UserProfile, kind: RoutineKind) -> SlotOutcome {
        let start = Instant::now();
        match self.attempt(profile, kind).await {
            Ok(routine) => {
                info!(
                    slot = kind.slot_key(),
                    steps = routine.steps.len(),
                    products = routine.product_count(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Routine generated"
                );
                Ok(routine)
            }
            Err(e) => {
                warn!(slot = kind.slot_key(), error = %e, "Routine generation failed");
                Err(SlotFailure::from(e))
            }
        }
    }

    /// The prompt that would be sent for `kind`, evidence included
    pub fn prompt_for(&self, profile: &UserProfile, kind: RoutineKind) -> String {
        let query = retrieval_query(profile, kind);
        let evidence = self.rag.gather(&query, &profile.exclusions());
        build_prompt(profile, kind, &evidence.block)
    }

    async fn attempt(&self, profile: &UserProfile, kind: RoutineKind) -> Result<Routine> {
        let prompt = self.prompt_for(profile, kind);
        let raw = self
            .backend
            .complete_structured(&prompt, &self.schema)
            .await?;
        parse_routine(&raw, kind)
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackend> {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::errors::GlowError;
    use crate::rag::{CatalogIndex, ConstrainedRetriever};
    use crate::types::{Budget, FailureKind, Level, ProductRecord, SkinType};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records prompts and replies with a fixed body
    struct RecordingBackend {
        reply: std::result::Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingBackend {
        fn replying(reply: std::result::Result<String, String>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "test"
        }

        async fn complete_structured(&self, prompt: &str, _schema: &Value) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(GlowError::Generation)
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            skin_type: SkinType::Combination,
            hydration: Level::Medium,
            sensitivity: Level::Low,
            age: 29,
            goals: "Balance".to_string(),
            budget: Budget::default(),
            avoid_ingredients: vec!["parabens".to_string()],
        }
    }

    fn rag() -> RAGPipeline {
        let records = vec![
            ProductRecord::new("Gentle Foam", "cleanser", "22€", "aloe, chamomile"),
            ProductRecord::new("Sun Veil SPF50", "sunscreen", "19€", "zinc oxide, parabens"),
        ];
        let index = CatalogIndex::build(records, Arc::new(HashingEmbedder::new())).unwrap();
        RAGPipeline::new(ConstrainedRetriever::new(Arc::new(index)))
    }

    fn reply(kind: &str) -> String {
        serde_json::json!({
            "routine_type": kind,
            "target_skin_type": "Combination",
            "steps": [{
                "step_name": "Cleansing",
                "products": [{"name": "Gentle Foam", "brand": "Glow Lab", "description": "Soft", "price_estimation": "22€"}],
                "usage_tips": "Morning and evening"
            }],
            "global_advice": "Wear sunscreen",
            "total_estimated_budget": "22€"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_generate_success() {
        let backend = Arc::new(RecordingBackend::replying(Ok(reply("Morning"))));
        let generator = StructuredGenerator::new(rag(), backend.clone());

        let routine = generator.generate(&profile(), RoutineKind::Morning).await.unwrap();
        assert_eq!(routine.steps[0].products[0].name, "Gentle Foam");

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Gentle Foam (cleanser) - 22€"));
        assert!(!prompts[0].contains("Sun Veil"));
    }

    #[tokio::test]
    async fn test_backend_error_becomes_generation_failure() {
        let backend = Arc::new(RecordingBackend::replying(Err("503".to_string())));
        let generator = StructuredGenerator::new(rag(), backend);

        let failure = generator.generate(&profile(), RoutineKind::Evening).await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Generation);
        assert!(failure.message.contains("503"));
    }

    #[tokio::test]
    async fn test_invalid_reply_becomes_schema_failure() {
        let backend = Arc::new(RecordingBackend::replying(Ok(r#"{"routine_type": "Weekly"}"#.to_string())));
        let generator = StructuredGenerator::new(rag(), backend.clone());

        let failure = generator.generate(&profile(), RoutineKind::Weekly).await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::SchemaValidation);
        // single attempt, no retry
        assert_eq!(backend.prompts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_prompt_for_respects_exclusions() {
        let backend = Arc::new(RecordingBackend::replying(Ok(String::new())));
        let generator = StructuredGenerator::new(rag(), backend);
        let prompt = generator.prompt_for(&profile(), RoutineKind::Morning);
        assert!(prompt.contains("Ingredients to avoid: parabens"));
        assert!(!prompt.contains("Sun Veil SPF50 (sunscreen)"));
    }
}
