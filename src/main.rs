//! Glow - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use glow::{
    advisor::{build_embedder, build_index, Advisor},
    cli::{Args, Commands, Verbosity},
    config::Config,
    diagnosis::{DiagnosisInput, RuleBasedClassifier},
    display,
    doctor::Doctor,
    logging,
    rag::{ConstrainedRetriever, RetrievalQuery},
    types::UserProfile,
};

#[tokio::main]
async fn main() -> Result<()> {
    // API keys may live in a local .env
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config = load_config(&args)?;
    logging::init(args.verbosity(), &config.logging.level);

    match &args.command {
        Commands::Generate {
            profile,
            diagnosis,
            output,
        } => {
            let profile = read_profile(profile.as_deref(), diagnosis.as_deref())?;
            run_generate(&args, config, &profile, output.as_deref()).await?;
        }
        Commands::Search { query, k, avoid } => {
            run_search(&args, config, query, *k, avoid).await?;
        }
        Commands::Doctor => {
            let report = Doctor::new(config).run_checks().await;
            report.print();
            std::process::exit(if report.is_healthy() { 0 } else { 1 });
        }
        Commands::Config => {
            show_config(&args, &config)?;
        }
    }

    Ok(())
}

/// Config file plus command-line overrides
fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::load(args.config.clone()).context("Failed to load configuration")?;

    if let Some(catalog) = &args.catalog {
        config.catalog.path = catalog.to_string_lossy().to_string();
    }
    if let Some(model) = &args.model {
        config.generation.model = model.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn read_profile(profile: Option<&Path>, diagnosis: Option<&Path>) -> Result<UserProfile> {
    match (profile, diagnosis) {
        (Some(path), _) => UserProfile::from_file(path)
            .with_context(|| format!("Failed to read profile {}", path.display())),
        (None, Some(path)) => {
            let answers = DiagnosisInput::from_file(path)
                .with_context(|| format!("Failed to read diagnosis {}", path.display()))?;
            Ok(answers.into_profile(&RuleBasedClassifier)?)
        }
        (None, None) => anyhow::bail!("Either --profile or --diagnosis is required"),
    }
}

fn spinner(verbosity: Verbosity, message: &str) -> ProgressBar {
    if !verbosity.show_progress() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn run_generate(
    args: &Args,
    config: Config,
    profile: &UserProfile,
    output: Option<&Path>,
) -> Result<()> {
    let pb = spinner(args.verbosity(), "Indexing catalog...");
    // Model download and catalog embedding are blocking work
    let advisor = tokio::task::spawn_blocking(move || Advisor::bootstrap(&config))
        .await
        .context("Bootstrap task panicked")?;
    let advisor = match advisor {
        Ok(advisor) => advisor,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e).context("Failed to initialize advisor");
        }
    };

    pb.set_message(format!(
        "Generating routines with {} ({})...",
        advisor.backend().name(),
        advisor.backend().model()
    ));
    let set = advisor.generate_all(profile).await;
    pb.finish_and_clear();

    print!("{}", display::render_routine_set(&set));

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&set.export())?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} {}", "Saved to".green(), path.display());
    }

    if set.is_total_failure() {
        anyhow::bail!("No routine could be generated");
    }

    Ok(())
}

async fn run_search(
    args: &Args,
    config: Config,
    query: &str,
    k: Option<usize>,
    avoid: &[String],
) -> Result<()> {
    let pb = spinner(args.verbosity(), "Indexing catalog...");
    let top_k = k.unwrap_or(config.retrieval.top_k);
    let overfetch = config.retrieval.overfetch_factor;

    let index = tokio::task::spawn_blocking(move || {
        build_embedder(&config).and_then(|embedder| build_index(&config, embedder))
    })
    .await
    .context("Indexing task panicked")?;
    pb.finish_and_clear();
    let index = index.context("Failed to index catalog")?;

    let retriever = ConstrainedRetriever::with_overfetch(index, overfetch);
    let query = RetrievalQuery::new(query, top_k).excluding(avoid.iter().cloned());
    let products = retriever.search(&query)?;

    print!("{}", display::render_products(&products));
    Ok(())
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    println!("\n{}\n", "Glow configuration".bold().cyan());

    if let Some(path) = args.config.clone().or_else(Config::default_path) {
        let state = if path.exists() { "" } else { " (not found, using defaults)" };
        println!("File: {}{}\n", path.display(), state);
    }

    print!("{}", toml::to_string_pretty(config).context("Failed to render configuration")?);
    println!("\nVerbosity: {}", args.verbosity().as_str());
    Ok(())
}
