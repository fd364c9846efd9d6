//! Diagnosis intake
//!
//! Turns questionnaire answers (0-10 sliders, a budget in euros, free-text
//! allergies) into the [`UserProfile`] the generator consumes. The skin type
//! comes from the user when declared, otherwise from a classifier.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::errors::{GlowError, Result};
use crate::types::{Budget, Level, SkinType, UserProfile};

/// Highest value a questionnaire slider can take
pub const MAX_SLIDER: u8 = 10;

/// Bucket a 0-10 slider: 0-3 Low, 4-7 Medium, 8+ High
pub fn bucket_level(value: u8) -> Level {
    match value {
        0..=3 => Level::Low,
        4..=7 => Level::Medium,
        _ => Level::High,
    }
}

/// Measured or self-reported skin features, each on a 0-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinFeatures {
    pub oil: u8,
    pub hydration: u8,
    pub sensitivity: u8,
}

/// Classifier verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub skin_type: SkinType,
    /// 0.0-1.0
    pub confidence: f32,
}

/// Infers a skin type from features
pub trait SkinTypeClassifier: Send + Sync {
    fn classify(&self, features: &SkinFeatures) -> Classification;
}

/// Threshold rules over the three sliders. First matching rule wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    const CONFIDENCE: f32 = 0.5;
}

impl SkinTypeClassifier for RuleBasedClassifier {
    fn classify(&self, features: &SkinFeatures) -> Classification {
        let SkinFeatures {
            oil,
            hydration,
            sensitivity,
        } = *features;

        let skin_type = if sensitivity > 6 {
            SkinType::Sensitive
        } else if oil > 7 {
            SkinType::Oily
        } else if oil < 3 {
            SkinType::Dry
        } else if oil > 6 && hydration < 4 {
            SkinType::Combination
        } else if hydration < 3 {
            SkinType::Dry
        } else {
            SkinType::Normal
        };

        Classification {
            skin_type,
            confidence: Self::CONFIDENCE,
        }
    }
}

/// Raw questionnaire answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosisInput {
    pub age: u8,
    /// Skin type stated by the user; overrides the classifier
    #[serde(default)]
    pub declared_skin_type: Option<SkinType>,
    pub oil: u8,
    pub hydration: u8,
    pub sensitivity: u8,
    /// Total routine budget in euros
    pub budget_eur: u32,
    #[serde(default)]
    pub goals: Vec<String>,
    /// Comma-separated ingredients to avoid
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub temperature_c: Option<f32>,
    #[serde(default)]
    pub humidity_pct: Option<u8>,
}

impl DiagnosisInput {
    /// Parse answers from a TOML or JSON file, by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&contents)?),
            _ => toml::from_str(&contents).map_err(|e| {
                GlowError::Configuration(format!(
                    "Failed to parse diagnosis {}: {}",
                    path.display(),
                    e
                ))
            }),
        }
    }

    pub fn features(&self) -> SkinFeatures {
        SkinFeatures {
            oil: self.oil,
            hydration: self.hydration,
            sensitivity: self.sensitivity,
        }
    }

    /// Build the generation profile
    pub fn into_profile(self, classifier: &dyn SkinTypeClassifier) -> Result<UserProfile> {
        self.validate()?;

        let skin_type = match self.declared_skin_type {
            Some(declared) => declared,
            None => {
                let verdict = classifier.classify(&self.features());
                debug!(
                    skin_type = %verdict.skin_type,
                    confidence = verdict.confidence,
                    "Skin type inferred"
                );
                verdict.skin_type
            }
        };

        let avoid_ingredients = self
            .allergies
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(UserProfile {
            skin_type,
            hydration: bucket_level(self.hydration),
            sensitivity: bucket_level(self.sensitivity),
            age: self.age,
            goals: self.goals_text(),
            budget: Budget::from_amount(self.budget_eur),
            avoid_ingredients,
        })
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("oil", self.oil),
            ("hydration", self.hydration),
            ("sensitivity", self.sensitivity),
        ] {
            if value > MAX_SLIDER {
                return Err(GlowError::Configuration(format!(
                    "{} must be between 0 and {}, got {}",
                    name, MAX_SLIDER, value
                )));
            }
        }

        if matches!(self.humidity_pct, Some(h) if h > 100) {
            return Err(GlowError::Configuration(
                "humidity_pct must be between 0 and 100".to_string(),
            ));
        }

        Ok(())
    }

    fn goals_text(&self) -> String {
        let goals: Vec<&str> = self
            .goals
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .collect();
        let goals = goals.join(", ");

        let environment = match (self.temperature_c, self.humidity_pct) {
            (Some(t), Some(h)) => Some(format!(
                "Living in a {}°C environment with {}% humidity.",
                t, h
            )),
            (Some(t), None) => Some(format!("Living in a {}°C environment.", t)),
            (None, Some(h)) => Some(format!("Living in an environment with {}% humidity.", h)),
            (None, None) => None,
        };

        match environment {
            Some(env) if goals.is_empty() => env,
            Some(env) => format!("{}. {}", goals, env),
            None => goals,
        }
    }
}
