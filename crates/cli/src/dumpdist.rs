//! dumpdist - Summarize a saved distribution JSON.
//!
//! Prints the distribution header, per-partner totals, and a per-size
//! breakdown; optionally a per-municipality breakdown too.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};

use valla_core::Distribution;

/// Summarize a distribution produced by distplan.
#[derive(Parser, Debug)]
#[command(name = "dumpdist")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a distribution JSON produced by distplan
    input: PathBuf,

    /// Also break counts down by municipality
    #[arg(short = 'm', long = "by-municipality", action = ArgAction::SetTrue)]
    by_municipality: bool,
}

/// Per-partner counts keyed by a grouping field of the items.
fn breakdown<'a, F>(distribution: &'a Distribution, key_fn: F) -> BTreeMap<&'a str, Vec<usize>>
where
    F: Fn(&'a valla_core::DistributionItem) -> &'a str,
{
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for item in &distribution.items {
        let counts = groups
            .entry(key_fn(item))
            .or_insert_with(|| vec![0; distribution.partners.len()]);
        if let Some(slot) = counts.get_mut(item.partner_index) {
            *slot += 1;
        }
    }
    groups
}

fn print_breakdown(label: &str, groups: &BTreeMap<&str, Vec<usize>>, partners: &[String]) {
    println!();
    println!("by {label}:");
    for (key, counts) in groups {
        println!("  {key}");
        for (idx, name) in partners.iter().enumerate() {
            println!("    [{idx}] {name}: {}", counts[idx]);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let distribution: Distribution =
        serde_json::from_str(&data).context("input is not a distribution JSON")?;

    println!("distribution {}", distribution.id);
    println!("  seed: {}", distribution.seed);
    println!("  threshold: {}m", distribution.threshold_m);
    println!("  active: {}", distribution.active);
    println!("  items: {}", distribution.items.len());

    let overflow = distribution.items.iter().filter(|i| i.overflow).count();
    if overflow > 0 {
        println!("  overflow items: {overflow}");
    }

    println!();
    println!("partners:");
    for (idx, name) in distribution.partners.iter().enumerate() {
        let count = distribution.partner_counts.get(idx).copied().unwrap_or(0);
        println!("  [{idx}] {name}: {count}");
    }

    let by_size = breakdown(&distribution, |item| item.size_key.as_str());
    print_breakdown("size", &by_size, &distribution.partners);

    if args.by_municipality {
        let by_municipality = breakdown(&distribution, |item| item.municipality_key.as_str());
        print_breakdown("municipality", &by_municipality, &distribution.partners);
    }

    Ok(())
}
