//! Routine objects produced by structured generation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::errors::GlowError;

/// Routine slot. Each slot is generated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoutineKind {
    Morning,
    Evening,
    Weekly,
}

impl RoutineKind {
    /// Generation order used by the orchestrator
    pub const ALL: [RoutineKind; 3] = [Self::Morning, Self::Evening, Self::Weekly];

    /// Key used in routine sets and exports
    pub fn slot_key(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
            Self::Weekly => "weekly",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Evening => "Evening",
            Self::Weekly => "Weekly",
        }
    }
}

impl fmt::Display for RoutineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A product recommended for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendedProduct {
    pub name: String,
    pub brand: String,
    /// Why this product was chosen
    pub description: String,
    /// Estimated price, e.g. "15€"
    pub price_estimation: String,
}

/// One step of a routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutineStep {
    pub step_name: String,
    pub products: Vec<RecommendedProduct>,
    pub usage_tips: String,
}

/// A validated routine. Step order is the execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Routine {
    pub routine_type: RoutineKind,
    pub target_skin_type: String,
    pub steps: Vec<RoutineStep>,
    pub global_advice: String,
    pub total_estimated_budget: String,
}

impl Routine {
    pub fn product_count(&self) -> usize {
        self.steps.iter().map(|s| s.products.len()).sum()
    }
}

/// Category of a slot failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Backend error, timeout, or empty reply
    Generation,
    /// Reply did not match the routine schema
    SchemaValidation,
}

/// Why a slot has no routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<GlowError> for SlotFailure {
    fn from(err: GlowError) -> Self {
        let kind = match err {
            GlowError::SchemaValidation(_) | GlowError::Serialization(_) => {
                FailureKind::SchemaValidation
            }
            _ => FailureKind::Generation,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for SlotFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Outcome of one slot generation
pub type SlotOutcome = std::result::Result<Routine, SlotFailure>;

/// The three slot outcomes of one generation run
#[derive(Debug, Clone)]
pub struct RoutineSet {
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    morning: SlotOutcome,
    evening: SlotOutcome,
    weekly: SlotOutcome,
}

/// Serializable view of a routine set; failed slots are `null`
#[derive(Debug, Serialize)]
pub struct RoutineExport<'a> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub morning: Option<&'a Routine>,
    pub evening: Option<&'a Routine>,
    pub weekly: Option<&'a Routine>,
    pub failures: BTreeMap<&'static str, &'a SlotFailure>,
}

impl RoutineSet {
    pub fn new(
        run_id: Uuid,
        morning: SlotOutcome,
        evening: SlotOutcome,
        weekly: SlotOutcome,
    ) -> Self {
        Self {
            run_id,
            generated_at: Utc::now(),
            morning,
            evening,
            weekly,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn outcome(&self, kind: RoutineKind) -> &SlotOutcome {
        match kind {
            RoutineKind::Morning => &self.morning,
            RoutineKind::Evening => &self.evening,
            RoutineKind::Weekly => &self.weekly,
        }
    }

    /// The routine for a slot, or `None` if that slot failed
    pub fn get(&self, kind: RoutineKind) -> Option<&Routine> {
        self.outcome(kind).as_ref().ok()
    }

    /// Outcomes in slot order
    pub fn iter(&self) -> impl Iterator<Item = (RoutineKind, &SlotOutcome)> {
        RoutineKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.outcome(kind)))
    }

    pub fn succeeded(&self) -> usize {
        self.iter().filter(|(_, o)| o.is_ok()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.succeeded() == RoutineKind::ALL.len()
    }

    pub fn is_total_failure(&self) -> bool {
        self.succeeded() == 0
    }

    pub fn export(&self) -> RoutineExport<'_> {
        let failures = self
            .iter()
            .filter_map(|(kind, outcome)| outcome.as_ref().err().map(|f| (kind.slot_key(), f)))
            .collect();

        RoutineExport {
            run_id: self.run_id,
            generated_at: self.generated_at,
            morning: self.get(RoutineKind::Morning),
            evening: self.get(RoutineKind::Evening),
            weekly: self.get(RoutineKind::Weekly),
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routine(kind: RoutineKind) -> Routine {
        Routine {
            routine_type: kind,
            target_skin_type: "Dry".to_string(),
            steps: vec![RoutineStep {
                step_name: "Cleanse".to_string(),
                products: vec![RecommendedProduct {
                    name: "Milky Oil Cleanser".to_string(),
                    brand: "Glow Lab".to_string(),
                    description: "Comforting".to_string(),
                    price_estimation: "28€".to_string(),
                }],
                usage_tips: "Massage gently".to_string(),
            }],
            global_advice: "Stay hydrated".to_string(),
            total_estimated_budget: "28€".to_string(),
        }
    }

    fn failure() -> SlotFailure {
        SlotFailure::from(GlowError::Generation("backend down".to_string()))
    }

    #[test]
    fn test_slot_keys_in_order() {
        let keys: Vec<&str> = RoutineKind::ALL.iter().map(|k| k.slot_key()).collect();
        assert_eq!(keys, vec!["morning", "evening", "weekly"]);
    }

    #[test]
    fn test_failure_kind_from_error() {
        let schema = SlotFailure::from(GlowError::SchemaValidation("steps empty".into()));
        assert_eq!(schema.kind, FailureKind::SchemaValidation);
        assert!(schema.message.contains("steps empty"));

        let generation = failure();
        assert_eq!(generation.kind, FailureKind::Generation);
    }

    #[test]
    fn test_routine_set_partial() {
        let set = RoutineSet::new(
            Uuid::new_v4(),
            Ok(routine(RoutineKind::Morning)),
            Err(failure()),
            Ok(routine(RoutineKind::Weekly)),
        );

        assert_eq!(set.succeeded(), 2);
        assert!(!set.is_complete());
        assert!(!set.is_total_failure());
        assert!(set.get(RoutineKind::Evening).is_none());
        assert_eq!(set.iter().count(), 3);
    }

    #[test]
    fn test_export_uses_null_for_failed_slots() {
        let set = RoutineSet::new(
            Uuid::new_v4(),
            Ok(routine(RoutineKind::Morning)),
            Err(failure()),
            Err(failure()),
        );

        let json = serde_json::to_value(set.export()).unwrap();
        assert!(json["morning"].is_object());
        assert!(json["evening"].is_null());
        assert!(json["weekly"].is_null());
        assert_eq!(json["failures"]["evening"]["kind"], "generation");
        assert!(json["failures"].get("morning").is_none());
    }

    #[test]
    fn test_routine_rejects_unknown_fields() {
        let json = serde_json::json!({
            "routine_type": "Morning",
            "target_skin_type": "Dry",
            "steps": [],
            "global_advice": "",
            "total_estimated_budget": "",
            "mood": "sunny"
        });
        assert!(serde_json::from_value::<Routine>(json).is_err());
    }

    #[test]
    fn test_product_count() {
        assert_eq!(routine(RoutineKind::Evening).product_count(), 1);
    }
}
