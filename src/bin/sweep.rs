use std::fs;
use std::path::Path;

use clap::Parser;

use vk_egonet::config::sweep_config::SweepConfig;
use vk_egonet::ga::sweep::outcome_key;
use vk_egonet::ga::run_sweep;
use vk_egonet::graph::adjacency_from_json;
use vk_egonet::utils::{logger, validation::Validate};

#[derive(Parser)]
#[command(name = "sweep")]
#[command(about = "GA hyperparameter sweep over a collected ego-graph")]
struct Args {
    /// Path to the sweep TOML configuration
    #[arg(short, long, default_value = "sweep-config.toml")]
    config: String,

    #[arg(short, long)]
    verbose: bool,

    /// Show the grid without evaluating it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting hyperparameter sweep");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match SweepConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    let combos = config.combinations();
    display_summary(&config, combos.len());

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No evaluation will occur");
        for params in &combos {
            println!("  {}", outcome_key(params));
        }
        return Ok(());
    }

    let json = fs::read_to_string(&config.input.adjacency_file)?;
    let adjacency = adjacency_from_json(&json)?;

    let report = run_sweep(adjacency, combos, config.workers(), config.seed()).await?;

    let out_file = Path::new(config.output_path()).join("result.json");
    if let Some(parent) = out_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out_file, serde_json::to_string_pretty(&report)?)?;

    tracing::info!("✅ Sweep completed: {} grid points", report.combinations);
    println!("✅ Sweep completed: {} grid points", report.combinations);
    println!("📁 Results written to {}", out_file.display());

    Ok(())
}

fn display_summary(config: &SweepConfig, combinations: usize) {
    println!("📋 Sweep Summary:");
    println!("  Name: {}", config.sweep.name);
    if let Some(description) = &config.sweep.description {
        println!("  Description: {}", description);
    }
    println!("  Input: {}", config.input.adjacency_file);
    println!("  Output: {}", config.output_path());
    println!("  Workers: {}", config.workers());
    println!("  Grid points: {}", combinations);
    if let Some(seed) = config.seed() {
        println!("  Seed: {}", seed);
    }
    println!();
}
