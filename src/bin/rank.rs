use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use snakedqn::history::rank_models;

#[derive(Parser)]
#[command(name = "rank")]
#[command(about = "Rank trained runs by their best evaluation")]
struct Cli {
    /// Directory holding one sub-directory per run
    #[arg(long, default_value = "models")]
    models_dir: PathBuf,

    /// Training episodes averaged for the recent length column
    #[arg(long, default_value_t = 1000)]
    last: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let ranked = rank_models(&cli.models_dir, cli.last)
        .with_context(|| format!("failed to scan {}", cli.models_dir.display()))?;

    if ranked.is_empty() {
        println!("No runs with a history or evaluation log under {}", cli.models_dir.display());
        return Ok(());
    }

    println!("{:<30} {:>15} {:>10} {:>15}", "Model Name", "Best Avg Length", "At Episode", "Recent Length");
    println!("{}", "-".repeat(73));
    for summary in &ranked {
        let (best, episode) = match &summary.best {
            Some(record) => (format!("{:.2}", record.average_length), record.episode.to_string()),
            None => ("-".to_string(), "-".to_string()),
        };
        let recent = summary.recent_average.map_or("-".to_string(), |avg| format!("{:.2}", avg));
        println!("{:<30} {:>15} {:>10} {:>15}", summary.name, best, episode, recent);
    }
    println!("\nTotal models analyzed: {}", ranked.len());

    Ok(())
}
