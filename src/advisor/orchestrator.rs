//! Routine orchestrator
//!
//! Runs the three slots in fixed order and collects every outcome. A failed
//! slot never stops the next one.

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::generation::StructuredGenerator;
use crate::types::{RoutineKind, RoutineSet, UserProfile};

/// Coordinates one full generation run per profile
#[derive(Clone)]
pub struct RoutineOrchestrator {
    generator: StructuredGenerator,
}

impl RoutineOrchestrator {
    pub fn new(generator: StructuredGenerator) -> Self {
        Self { generator }
    }

    /// Generate Morning, Evening and Weekly, strictly one after another
    pub async fn generate_all(&self, profile: &UserProfile) -> RoutineSet {
        let run_id = Uuid::new_v4();
        let span = info_span!("generate_all", %run_id, skin_type = %profile.skin_type);

        async {
            let morning = self.generator.generate(profile, RoutineKind::Morning).await;
            let evening = self.generator.generate(profile, RoutineKind::Evening).await;
            let weekly = self.generator.generate(profile, RoutineKind::Weekly).await;

            let set = RoutineSet::new(run_id, morning, evening, weekly);
            info!(succeeded = set.succeeded(), "Generation run finished");
            set
        }
        .instrument(span)
        .await
    }

    pub fn generator(&self) -> &StructuredGenerator {
        &self.generator
    }
}
