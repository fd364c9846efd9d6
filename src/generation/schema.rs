//! Routine output schema and validation
//!
//! Backends are asked to return JSON matching [`routine_schema`]. Replies are
//! then checked here; anything that does not conform is a
//! `SchemaValidation` error, never coerced into a routine.

use serde_json::{json, Value};

use crate::errors::{GlowError, Result};
use crate::types::{Routine, RoutineKind};

/// Schema name sent to backends that require one
pub const SCHEMA_NAME: &str = "skincare_routine";

/// JSON Schema for [`Routine`]. Every field is required and no extra
/// properties are allowed.
pub fn routine_schema() -> Value {
    let product = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "description": "Full product name" },
            "brand": { "type": "string", "description": "Product brand" },
            "description": { "type": "string", "description": "Short explanation of why this product was chosen" },
            "price_estimation": { "type": "string", "description": "Estimated price, e.g. '15€'" }
        },
        "required": ["name", "brand", "description", "price_estimation"],
        "additionalProperties": false
    });

    let step = json!({
        "type": "object",
        "properties": {
            "step_name": { "type": "string", "description": "Step name, e.g. 'Cleansing', 'Serum'" },
            "products": { "type": "array", "items": product, "minItems": 1 },
            "usage_tips": { "type": "string", "description": "Application advice for this step" }
        },
        "required": ["step_name", "products", "usage_tips"],
        "additionalProperties": false
    });

    json!({
        "type": "object",
        "properties": {
            "routine_type": { "type": "string", "enum": ["Morning", "Evening", "Weekly"] },
            "target_skin_type": { "type": "string" },
            "steps": { "type": "array", "items": step, "minItems": 1, "description": "Ordered routine steps" },
            "global_advice": { "type": "string" },
            "total_estimated_budget": { "type": "string" }
        },
        "required": ["routine_type", "target_skin_type", "steps", "global_advice", "total_estimated_budget"],
        "additionalProperties": false
    })
}

/// Locate the first complete top-level JSON object in `text`.
///
/// Braces inside string literals are ignored, so fenced or chatty replies
/// (```json ... ```) still yield the object.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &byte) in bytes.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if in_string {
            match byte {
                b'\\' => escape_next = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' if start.is_some() => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|s| &text[s..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse and validate a backend reply for the `expected` slot
pub fn parse_routine(raw: &str, expected: RoutineKind) -> Result<Routine> {
    if raw.trim().is_empty() {
        return Err(GlowError::SchemaValidation("Backend returned an empty reply".to_string()));
    }

    let json = extract_json_object(raw).ok_or_else(|| {
        GlowError::SchemaValidation("No JSON object found in backend reply".to_string())
    })?;

    let routine: Routine = serde_json::from_str(json)
        .map_err(|e| GlowError::SchemaValidation(format!("Reply does not match routine schema: {}", e)))?;

    validate_routine(&routine, expected)?;
    Ok(routine)
}

/// Structural checks serde cannot express
pub fn validate_routine(routine: &Routine, expected: RoutineKind) -> Result<()> {
    if routine.routine_type != expected {
        return Err(GlowError::SchemaValidation(format!(
            "routine_type {} does not match requested slot {}",
            routine.routine_type, expected
        )));
    }

    if routine.steps.is_empty() {
        return Err(GlowError::SchemaValidation("Routine has no steps".to_string()));
    }

    for (i, step) in routine.steps.iter().enumerate() {
        if step.step_name.trim().is_empty() {
            return Err(GlowError::SchemaValidation(format!("Step {} has no name", i + 1)));
        }
        if step.products.is_empty() {
            return Err(GlowError::SchemaValidation(format!(
                "Step {} ('{}') has no products",
                i + 1,
                step.step_name
            )));
        }
        if step.products.iter().any(|p| p.name.trim().is_empty()) {
            return Err(GlowError::SchemaValidation(format!(
                "Step {} ('{}') has a product without a name",
                i + 1,
                step.step_name
            )));
        }
    }

    Ok(())
}
