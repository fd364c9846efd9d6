//! Type definitions module
//!
//! Catalog records, user profiles, and the routine objects produced by
//! generation.

pub mod product;
pub mod profile;
pub mod routine;

// Re-export commonly used types
pub use product::ProductRecord;
pub use profile::{Budget, Level, SkinType, UserProfile};
pub use routine::{
    FailureKind, RecommendedProduct, Routine, RoutineKind, RoutineSet, RoutineStep,
    SlotFailure, SlotOutcome,
};
