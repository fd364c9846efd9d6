//! Slot queries and generation prompts

use crate::types::{RoutineKind, UserProfile};

/// Keywords appended to retrieval queries when the budget is flagged low
pub const LOW_BUDGET_KEYWORDS: &str = "affordable low-cost";

/// Fixed retrieval keywords for each slot
pub fn slot_keywords(kind: RoutineKind) -> &'static str {
    match kind {
        RoutineKind::Morning => "morning cleanser sunscreen",
        RoutineKind::Evening => "evening makeup-remover cleanser night-cream",
        RoutineKind::Weekly => "weekly mask exfoliant treatment",
    }
}

/// Retrieval query for one slot
pub fn retrieval_query(profile: &UserProfile, kind: RoutineKind) -> String {
    let mut query = format!(
        "{} products for {} skin, hydration {}, sensitivity {}",
        slot_keywords(kind),
        profile.skin_type,
        profile.hydration,
        profile.sensitivity
    );

    if profile.budget.low {
        query.push(' ');
        query.push_str(LOW_BUDGET_KEYWORDS);
    }

    query
}

fn slot_brief(kind: RoutineKind) -> &'static str {
    match kind {
        RoutineKind::Morning => {
            "Generate a complete MORNING routine. Detail each step (cleansing, serum, moisturizing, sun protection)."
        }
        RoutineKind::Evening => {
            "Generate a complete EVENING routine. Focus on makeup removal, cleansing and overnight repair."
        }
        RoutineKind::Weekly => {
            "Generate a WEEKLY treatment routine. Propose 2 or 3 occasional treatment steps (mask, exfoliation, ...) to do once or twice a week."
        }
    }
}

/// Full instruction for one slot: profile, evidence, and output rules
pub fn build_prompt(profile: &UserProfile, kind: RoutineKind, evidence: &str) -> String {
    let goals = if profile.goals.trim().is_empty() {
        "Daily care"
    } else {
        profile.goals.trim()
    };

    let evidence_section = if evidence.is_empty() {
        "No catalog products matched this profile. Rely on your general knowledge of skincare products.".to_string()
    } else {
        format!(
            "PRODUCTS AVAILABLE IN OUR CATALOG (use these first):\n{}",
            evidence
                .lines()
                .map(|line| format!("- {}", line))
                .collect::<Vec<_>>()
                .join("\n")
        )
    };

    format!(
        r#"You are a skincare expert.
{brief}

PROFILE:
- Skin type: {skin}
- Hydration: {hydration}
- Sensitivity: {sensitivity}
- Age: {age}
- Budget: {budget}
- Ingredients to avoid: {avoid}
- Goals: {goals}

{evidence_section}

INSTRUCTIONS:
1. Prefer the catalog products listed above over general knowledge whenever they fit.
2. Strictly respect the budget.
3. Never recommend a product containing an ingredient to avoid.
4. Set routine_type to "{kind}" and list the steps in the order they are performed.
5. Every step must recommend at least one product."#,
        brief = slot_brief(kind),
        skin = profile.skin_type,
        hydration = profile.hydration,
        sensitivity = profile.sensitivity,
        age = profile.age,
        budget = profile.budget.label,
        avoid = profile.exclusions_display(),
        goals = goals,
        evidence_section = evidence_section,
        kind = kind.as_str(),
    )
}
