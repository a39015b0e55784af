use std::collections::BTreeMap;
use std::fs;

use anyhow::Context;
use clap::Parser;

use vk_egonet::graph::{adjacency_from_json, gexf};
use vk_egonet::utils::logger;

#[derive(Parser)]
#[command(name = "export-gexf")]
#[command(about = "Convert an adjacency JSON file to GEXF for Gephi")]
struct Args {
    /// Adjacency list JSON produced by the collector
    #[arg(short, long, default_value = "friends.json")]
    input: String,

    /// Optional node table CSV (ID,Name) for labels
    #[arg(long)]
    labels: Option<String>,

    #[arg(short, long, default_value = "graph.gexf")]
    output: String,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let json =
        fs::read_to_string(&args.input).with_context(|| format!("reading {}", args.input))?;
    let adjacency = adjacency_from_json(&json)?;

    let labels = match &args.labels {
        Some(path) => read_labels(path)?,
        None => BTreeMap::new(),
    };

    let document = gexf::render(&adjacency, &labels);
    fs::write(&args.output, document).with_context(|| format!("writing {}", args.output))?;

    tracing::info!("✅ GEXF written to {}", args.output);
    println!("✅ GEXF written to {}", args.output);
    Ok(())
}

fn read_labels(path: &str) -> anyhow::Result<BTreeMap<i64, String>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("reading {}", path))?;

    let mut labels = BTreeMap::new();
    for record in reader.records() {
        let record = record?;
        let id: i64 = record
            .get(0)
            .unwrap_or_default()
            .parse()
            .with_context(|| format!("bad node id in {}", path))?;
        let name = record.get(1).unwrap_or_default().to_string();
        labels.insert(id, name);
    }
    Ok(labels)
}
