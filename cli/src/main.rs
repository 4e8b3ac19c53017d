//! Hand Pathway Simulator CLI
//!
//! Runs a multi-replication trial and prints the before/after waiting-list
//! comparison. Logging goes to stderr and follows `RUST_LOG` (default
//! `info`).

use anyhow::{Context, Result};
use clap::Parser;
use hand_pathway_sim::{PathwayConfig, Stage, Trial, TrialResults, TrialSummary};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hand-pathway-sim")]
#[command(about = "Discrete-event simulation of an elective hand-surgery pathway")]
#[command(version)]
struct Cli {
    /// JSON file overriding any subset of the default parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of replications
    #[arg(short, long)]
    runs: Option<usize>,

    /// Base RNG seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Simulation horizon in days
    #[arg(long)]
    horizon: Option<f64>,

    /// GP referrals per week (0 disables referrals)
    #[arg(long)]
    referrals_per_week: Option<f64>,

    /// Run replications on all cores
    #[arg(long)]
    parallel: bool,

    /// Write trial results and summary as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    summary: &'a TrialSummary,
    results: &'a TrialResults,
}

fn load_config(cli: &Cli) -> Result<PathwayConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => PathwayConfig::default(),
    };

    if let Some(runs) = cli.runs {
        config.number_of_runs = runs;
    }
    if let Some(seed) = cli.seed {
        config.rng_seed = seed;
    }
    if let Some(horizon) = cli.horizon {
        config.horizon_days = horizon;
    }
    if let Some(rate) = cli.referrals_per_week {
        config.referrals_per_week = rate;
    }
    Ok(config)
}

fn format_wait(wait: Option<f64>) -> String {
    match wait {
        Some(days) => format!("{:.1} days", days),
        None => "n/a (no qualifying referrals)".to_string(),
    }
}

fn print_summary(summary: &TrialSummary) {
    println!();
    println!("Waiting lists, before vs mean after {} runs", summary.runs);
    println!("{:<10} {:>10} {:>12}", "stage", "before", "after");
    for stage in Stage::ALL {
        let after = match stage {
            Stage::Clinic => summary.mean_after.clinic,
            Stage::Imaging => summary.mean_after.imaging,
            Stage::Therapy => summary.mean_after.therapy,
            Stage::Theatre => summary.mean_after.theatre,
        };
        println!("{:<10} {:>10} {:>12.1}", stage, summary.before.get(stage), after);
    }
    println!("{:<10} {:>10} {:>12.1}", "total", summary.total_before, summary.total_after);
    println!();
    println!("Referred on day 0:        {}", format_wait(summary.mean_wait_first_day));
    println!(
        "Referred on day {:<9} {}",
        format!("{}:", summary.final_day),
        format_wait(summary.mean_wait_final_day)
    );
    println!("Qualifying patients:      {}", summary.qualifying_patients);
    println!("Config hash:              {}", summary.config_hash);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let trial = Trial::new(config).context("invalid configuration")?;

    let results = if cli.parallel {
        trial.run_parallel()?
    } else {
        trial.run()?
    };
    let summary = results.summary();
    print_summary(&summary);

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&Report {
            summary: &summary,
            results: &results,
        })?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "results written");
    }
    Ok(())
}
