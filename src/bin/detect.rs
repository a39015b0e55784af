use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use vk_egonet::ga::{detect, GaParams};
use vk_egonet::graph::adjacency_from_json;
use vk_egonet::utils::logger;
use vk_egonet::utils::validation::Validate;

#[derive(Parser)]
#[command(name = "detect")]
#[command(about = "Detect communities in a collected ego-graph")]
struct Args {
    /// Adjacency list JSON produced by the collector
    #[arg(short, long, default_value = "friends.json")]
    input: String,

    /// Directory for communities.json
    #[arg(long, default_value = ".")]
    output_path: String,

    #[arg(long, default_value = "300")]
    population: usize,

    #[arg(long, default_value = "60")]
    generations: usize,

    /// Order of the power mean in the fitness function
    #[arg(long, default_value = "1.5")]
    r: f64,

    #[arg(long, default_value = "0.7")]
    crossover_rate: f64,

    #[arg(long, default_value = "0.2")]
    mutation_rate: f64,

    #[arg(long, default_value = "0.1")]
    elite_fraction: f64,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("🧬 Community detection genetic algorithm");

    let json =
        fs::read_to_string(&args.input).with_context(|| format!("reading {}", args.input))?;
    let adjacency = adjacency_from_json(&json)?;

    let params = GaParams {
        population: args.population,
        generations: args.generations,
        r: args.r,
        crossover_rate: args.crossover_rate,
        mutation_rate: args.mutation_rate,
        elite_fraction: args.elite_fraction,
    };
    params.validate()?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let started = std::time::Instant::now();
    let result = detect(&adjacency, &params, &mut rng)?;
    let elapsed = started.elapsed();

    println!("\nRESULTS:\n");
    println!("Communities: {}", result.communities.len());
    for (i, community) in result.communities.iter().enumerate() {
        println!("  #{} ({} members): {:?}", i + 1, community.len(), community);
    }
    println!("\nBest fitness: {:.4}", result.best_score);
    println!("Time: {:?}\n", elapsed);

    let report = serde_json::json!({
        "params": params,
        "best_score": result.best_score,
        "communities": result.communities,
    });
    let out_file = Path::new(&args.output_path).join("communities.json");
    if let Some(parent) = out_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out_file, serde_json::to_string_pretty(&report)?)?;

    tracing::info!("✅ Results written to {}", out_file.display());
    println!("📁 Results written to {}", out_file.display());

    Ok(())
}
