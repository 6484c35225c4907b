//! distplan - Plan a fair billboard distribution from a JSON inventory.
//!
//! Reads a JSON array of billboard records, runs the allocation engine,
//! and writes the resulting distribution (record, items, per-partner
//! counts) as JSON to a file or stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;

use valla_core::{
    Billboard, DistributionFilters, GenerateRequest, MemoryStore, generate_and_save,
};

/// Plan a fair billboard distribution across partners.
#[derive(Parser, Debug)]
#[command(name = "distplan")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a JSON array of billboard records
    input: PathBuf,

    /// Comma-separated partner names, in stable index order
    #[arg(short, long)]
    partners: String,

    /// Same-site distance cutoff in meters
    #[arg(short = 't', long = "threshold-meters", default_value = "100.0")]
    threshold_meters: f64,

    /// Seed for reproducible shuffling; generated and recorded when omitted
    #[arg(short, long)]
    seed: Option<String>,

    /// Distribution id to record; defaults to "dist-<seed>"
    #[arg(long)]
    id: Option<String>,

    /// Size filter recorded with the distribution
    #[arg(long)]
    size: Option<String>,

    /// Municipality filter recorded with the distribution
    #[arg(long)]
    municipality: Option<String>,

    /// City filter recorded with the distribution
    #[arg(long)]
    city: Option<String>,

    /// Path to write the distribution JSON to, or "-" for stdout
    #[arg(short, long, default_value = "-")]
    output: String,
}

/// Seed for runs that did not supply one: unix millis plus a process
/// suffix, unique enough per run and recorded in the output for replay.
fn generate_seed() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{millis}-{}", std::process::id())
}

fn parse_partners(raw: &str) -> anyhow::Result<Vec<String>> {
    let partners: Vec<String> = raw
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if partners.len() < 2 {
        bail!("at least 2 partners are required, got {}", partners.len());
    }
    Ok(partners)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let billboards: Vec<Billboard> =
        serde_json::from_str(&data).context("input is not a JSON array of billboard records")?;
    let billboards: Vec<Billboard> = billboards.into_iter().map(Billboard::normalize).collect();

    let partners = parse_partners(&args.partners)?;
    let seed = args.seed.clone().unwrap_or_else(generate_seed);
    let id = args.id.clone().unwrap_or_else(|| format!("dist-{seed}"));

    let request = GenerateRequest {
        id,
        filters: DistributionFilters {
            size: args.size.clone(),
            municipality: args.municipality.clone(),
            city: args.city.clone(),
            status: None,
            ad_type: None,
        },
        threshold_m: args.threshold_meters,
        partners,
        seed,
    };

    let mut store = MemoryStore::new();
    let distribution = generate_and_save(&mut store, &billboards, request)?;

    info!(
        "Planned distribution - id={}, items={}, seed={}",
        distribution.id,
        distribution.items.len(),
        distribution.seed
    );

    let json = serde_json::to_string_pretty(&distribution)?;
    let mut output: Box<dyn Write> = if args.output == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("failed to create {}", args.output))?;
        Box::new(BufWriter::new(file))
    };
    output.write_all(json.as_bytes())?;
    output.write_all(b"\n")?;
    output.flush()?;

    Ok(())
}
