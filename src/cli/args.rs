//! Command-line argument parsing for Glow
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Glow - catalog-grounded skincare routines
#[derive(Parser, Debug)]
#[command(name = "glow")]
#[command(version)]
#[command(about = "Generate morning, evening and weekly skincare routines grounded in a product catalog", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Product catalog CSV (overrides the config file)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Generation model (overrides the config file)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the three routines for a profile
    Generate {
        /// Profile file (TOML or JSON)
        #[arg(long, conflicts_with = "diagnosis", required_unless_present = "diagnosis")]
        profile: Option<PathBuf>,

        /// Questionnaire answers (TOML or JSON), converted into a profile
        #[arg(long)]
        diagnosis: Option<PathBuf>,

        /// Write the routine set as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search the catalog with ingredient exclusions
    Search {
        /// Free-text query
        query: String,

        /// Number of products to return
        #[arg(short)]
        k: Option<usize>,

        /// Comma-separated ingredients to avoid
        #[arg(long, value_delimiter = ',')]
        avoid: Vec<String>,
    },

    /// Run configuration, catalog and backend health checks
    Doctor,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
