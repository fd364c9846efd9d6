//! User profile value object
//!
//! The profile is read-only input to every pipeline stage. Serialized
//! profiles with unrecognized fields are rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Budget under which a profile is flagged low (euros, whole routine)
pub const LOW_BUDGET_THRESHOLD_EUR: u32 = 45;

/// Skin type label, as produced by the classifier or declared by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkinType {
    Normal,
    Dry,
    Oily,
    Combination,
    Sensitive,
}

impl SkinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Dry => "Dry",
            Self::Oily => "Oily",
            Self::Combination => "Combination",
            Self::Sensitive => "Sensitive",
        }
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse bucket for hydration and sensitivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Budget descriptor: free-text label plus the low-budget flag that steers
/// retrieval towards affordable products
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Budget {
    pub label: String,
    #[serde(default)]
    pub low: bool,
}

impl Budget {
    pub fn new(label: impl Into<String>, low: bool) -> Self {
        Self {
            label: label.into(),
            low,
        }
    }

    /// Budget from a total amount in euros
    pub fn from_amount(eur: u32) -> Self {
        if eur < LOW_BUDGET_THRESHOLD_EUR {
            Self::new(format!("{}€ (low budget)", eur), true)
        } else {
            Self::new(format!("{}€", eur), false)
        }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new("Medium (20-40€ per product)", false)
    }
}

/// Profile consumed by retrieval and generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserProfile {
    pub skin_type: SkinType,
    pub hydration: Level,
    pub sensitivity: Level,
    pub age: u8,
    #[serde(default)]
    pub goals: String,
    #[serde(default)]
    pub budget: Budget,
    /// Ingredient substrings to exclude, matched case-insensitively
    #[serde(default)]
    pub avoid_ingredients: Vec<String>,
}

impl UserProfile {
    /// Exclusion terms lowercased and trimmed, blanks dropped
    pub fn exclusions(&self) -> Vec<String> {
        self.avoid_ingredients
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Exclusions joined for display in prompts
    pub fn exclusions_display(&self) -> String {
        let terms: Vec<&str> = self
            .avoid_ingredients
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        if terms.is_empty() {
            "none".to_string()
        } else {
            terms.join(", ")
        }
    }

    /// Parse a profile from a TOML or JSON file, by extension
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&contents)?),
            _ => toml::from_str(&contents).map_err(|e| {
                crate::GlowError::Configuration(format!(
                    "Failed to parse profile {}: {}",
                    path.display(),
                    e
                ))
            }),
        }
    }
}
