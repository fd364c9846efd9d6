//! Product catalog loading
//!
//! The catalog is a CSV export with one product per row. Loading happens
//! once at startup, before the index is built.

pub mod loader;

pub use loader::{load_catalog, parse_catalog, REQUIRED_COLUMNS};
