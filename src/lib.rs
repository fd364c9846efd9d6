//! Glow - catalog-grounded skincare routine generation
//!
//! Given a skin profile, Glow retrieves matching products from a local
//! catalog (excluding any that contain ingredients the user must avoid) and
//! asks a language model for three schema-validated routines: morning,
//! evening and weekly.
//!
//! # Architecture
//!
//! - **catalog / embedding / rag**: CSV loading, vectorisation, exact cosine
//!   index, constrained retrieval and evidence composition
//! - **generation**: prompts, HTTP backends, structured output validation
//! - **advisor**: one-time bootstrap and the per-profile orchestrator
//! - **diagnosis**: questionnaire answers to profile

pub mod errors;
pub mod types;

pub use errors::{GlowError, Result};

pub mod catalog;
pub mod embedding;
pub mod rag;
pub mod generation;

pub mod advisor;
pub mod diagnosis;

pub mod cli;
pub mod config;
pub mod display;
pub mod doctor;
pub mod logging;

pub use advisor::{Advisor, RoutineOrchestrator};
pub use config::Config;
