//! Doctor command - configuration, catalog and backend health checks

use colored::Colorize;
use std::time::Instant;

use crate::catalog::load_catalog;
use crate::config::{Config, EmbeddingBackend, Provider};
use crate::generation::build_backend;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

impl CheckStatus {
    fn symbol(&self) -> String {
        match self {
            Self::Pass => "✓".green().to_string(),
            Self::Warning => "⚠".yellow().to_string(),
            Self::Fail => "✗".red().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub latency_ms: Option<u64>,
}

impl HealthCheck {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            latency_ms: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        !self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    pub fn print(&self) {
        println!("\n{}\n", "Glow health check".bold().cyan());

        for check in &self.checks {
            let latency = check
                .latency_ms
                .map(|ms| format!(" ({}ms)", ms))
                .unwrap_or_default();

            println!(
                "  {} {:<20} {}{}",
                check.status.symbol(),
                format!("{}:", check.name),
                check.message,
                latency
            );
        }

        println!();

        if self.is_healthy() {
            println!("  {} All checks passed\n", "✓".green());
        } else {
            println!("  {} Some checks failed\n", "✗".red());
        }
    }
}

pub struct Doctor {
    config: Config,
}

impl Doctor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run_checks(&self) -> HealthReport {
        let mut checks = vec![
            self.check_config(),
            self.check_catalog(),
            self.check_embedder(),
            self.check_api_key(),
        ];
        checks.push(self.check_backend().await);

        HealthReport { checks }
    }

    fn check_config(&self) -> HealthCheck {
        match self.config.validate() {
            Ok(()) => HealthCheck::new("Configuration", CheckStatus::Pass, "Valid"),
            Err(e) => HealthCheck::new("Configuration", CheckStatus::Fail, e.to_string()),
        }
    }

    fn check_catalog(&self) -> HealthCheck {
        let path = self.config.catalog_path();
        match load_catalog(&path) {
            Ok(records) => HealthCheck::new(
                "Catalog",
                CheckStatus::Pass,
                format!("{} products in {}", records.len(), path.display()),
            ),
            Err(e) => HealthCheck::new("Catalog", CheckStatus::Fail, e.to_string()),
        }
    }

    fn check_embedder(&self) -> HealthCheck {
        match self.config.embedding.backend {
            EmbeddingBackend::Hashing => {
                HealthCheck::new("Embedder", CheckStatus::Pass, "Feature hashing (offline)")
            }
            EmbeddingBackend::Candle => {
                let model_id = &self.config.embedding.model_id;
                let cached = hf_hub::Cache::default()
                    .model(model_id.clone())
                    .get("model.safetensors")
                    .is_some();
                if cached {
                    HealthCheck::new("Embedder", CheckStatus::Pass, format!("{} cached", model_id))
                } else {
                    HealthCheck::new(
                        "Embedder",
                        CheckStatus::Warning,
                        format!("{} will be downloaded on first run", model_id),
                    )
                }
            }
        }
    }

    fn check_api_key(&self) -> HealthCheck {
        let generation = &self.config.generation;
        match generation.provider {
            Provider::Ollama => HealthCheck::new("API key", CheckStatus::Pass, "Not required"),
            Provider::Mistral => match generation.resolve_api_key() {
                Ok(_) => HealthCheck::new(
                    "API key",
                    CheckStatus::Pass,
                    format!("{} is set", generation.api_key_env),
                ),
                Err(e) => HealthCheck::new("API key", CheckStatus::Fail, e.to_string()),
            },
        }
    }

    async fn check_backend(&self) -> HealthCheck {
        let backend = match build_backend(&self.config.generation) {
            Ok(backend) => backend,
            Err(e) => return HealthCheck::new("Generation", CheckStatus::Fail, e.to_string()),
        };

        let start = Instant::now();
        let reachable = backend.health_check().await;
        let latency = start.elapsed().as_millis() as u64;

        match reachable {
            Ok(true) => HealthCheck {
                latency_ms: Some(latency),
                ..HealthCheck::new(
                    "Generation",
                    CheckStatus::Pass,
                    format!("{} ({}) reachable", backend.name(), backend.model()),
                )
            },
            Ok(false) => HealthCheck::new(
                "Generation",
                CheckStatus::Fail,
                format!("{} at {} not reachable", backend.name(), self.config.generation.base_url()),
            ),
            Err(e) => HealthCheck::new("Generation", CheckStatus::Fail, e.to_string()),
        }
    }
}
