//! Terminal rendering of routine sets and search results

use colored::Colorize;
use std::fmt::Write;

use crate::types::{ProductRecord, Routine, RoutineKind, RoutineSet};

/// Render all three slots in order. Failed slots get a placeholder line.
pub fn render_routine_set(set: &RoutineSet) -> String {
    let mut out = String::new();

    for (kind, outcome) in set.iter() {
        let _ = writeln!(out, "\n{}", heading(kind));
        match outcome {
            Ok(routine) => render_routine(&mut out, routine),
            Err(failure) => {
                let _ = writeln!(
                    out,
                    "  {} {}",
                    "Routine unavailable:".red().bold(),
                    failure.message
                );
            }
        }
    }

    let summary = format!(
        "{}/{} routines generated (run {})",
        set.succeeded(),
        RoutineKind::ALL.len(),
        set.run_id()
    );
    let _ = writeln!(out, "\n{}", summary.dimmed());
    out
}

fn heading(kind: RoutineKind) -> String {
    let title = match kind {
        RoutineKind::Morning => "MORNING ROUTINE",
        RoutineKind::Evening => "EVENING ROUTINE",
        RoutineKind::Weekly => "WEEKLY TREATMENT",
    };
    format!("{}", title.bold().cyan())
}

fn render_routine(out: &mut String, routine: &Routine) {
    let _ = writeln!(
        out,
        "  {} {}   {} {}",
        "Skin type:".dimmed(),
        routine.target_skin_type,
        "Budget:".dimmed(),
        routine.total_estimated_budget
    );

    for (i, step) in routine.steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, step.step_name.bold());
        for product in &step.products {
            let _ = writeln!(
                out,
                "     {} {} ({}) {}",
                "•".green(),
                product.name,
                product.brand,
                product.price_estimation.yellow()
            );
            if !product.description.trim().is_empty() {
                let _ = writeln!(out, "       {}", product.description.dimmed());
            }
        }
        if !step.usage_tips.trim().is_empty() {
            let _ = writeln!(out, "     {} {}", "Tip:".italic(), step.usage_tips);
        }
    }

    if !routine.global_advice.trim().is_empty() {
        let _ = writeln!(out, "  {} {}", "Advice:".bold(), routine.global_advice);
    }
}

/// One line per search hit
pub fn render_products(products: &[ProductRecord]) -> String {
    if products.is_empty() {
        return format!("{}\n", "No matching products.".yellow());
    }

    let mut out = String::new();
    for (i, product) in products.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {} ({}) {}",
            i + 1,
            product.name.bold(),
            product.category,
            product.price.yellow()
        );
        let _ = writeln!(out, "    {}", product.ingredient_text.dimmed());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GlowError;
    use crate::types::{RecommendedProduct, RoutineStep, SlotFailure};
    use uuid::Uuid;

    fn routine(kind: RoutineKind) -> Routine {
        Routine {
            routine_type: kind,
            target_skin_type: "Oily".to_string(),
            steps: vec![RoutineStep {
                step_name: "Cleanse".to_string(),
                products: vec![RecommendedProduct {
                    name: "Clay Wash".to_string(),
                    brand: "Glow Lab".to_string(),
                    description: "Purifying gel".to_string(),
                    price_estimation: "12€".to_string(),
                }],
                usage_tips: "Massage for 30 seconds".to_string(),
            }],
            global_advice: "Stay hydrated".to_string(),
            total_estimated_budget: "12€".to_string(),
        }
    }

    #[test]
    fn test_failed_slot_placeholder() {
        let set = RoutineSet::new(
            Uuid::new_v4(),
            Ok(routine(RoutineKind::Morning)),
            Err(SlotFailure::from(GlowError::Generation("upstream 503".to_string()))),
            Ok(routine(RoutineKind::Weekly)),
        );
        let text = render_routine_set(&set);

        assert!(text.contains("MORNING ROUTINE"));
        assert!(text.contains("EVENING ROUTINE"));
        assert!(text.contains("Routine unavailable:"));
        assert!(text.contains("upstream 503"));
        assert!(text.contains("Clay Wash"));
        assert!(text.contains("Massage for 30 seconds"));

        let morning = text.find("MORNING").unwrap();
        let evening = text.find("EVENING").unwrap();
        let weekly = text.find("WEEKLY").unwrap();
        assert!(morning < evening && evening < weekly);
    }

    #[test]
    fn test_render_products() {
        assert!(render_products(&[]).contains("No matching products."));

        let text = render_products(&[ProductRecord::new("Gentle Foam", "cleanser", "22€", "aloe")]);
        assert!(text.contains("Gentle Foam"));
        assert!(text.contains("cleanser"));
    }
}
