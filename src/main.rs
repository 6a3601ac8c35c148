use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use snakedqn::{Agent, AgentConfig, Board, EncoderKind, Exploration, RewardConfig, RunConfig, TargetSync, Trainer};
use snakedqn::episode::TrainingEnd;
use snakedqn::game::{MAX_HEIGHT, MAX_WIDTH, MIN_SIDE};

#[derive(Parser)]
#[command(name = "snakedqn")]
#[command(version, about = "Snake with a deep Q-network agent")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train an agent, checkpointing and evaluating as it goes
    Train(Options),
    /// Play greedy games with a trained agent, no learning
    Evaluate(Options),
}

#[derive(Args)]
struct Options {
    /// Board rows (3-13)
    #[arg(short = 'H', long, default_value_t = 10)]
    height: usize,

    /// Board columns (3-24)
    #[arg(short = 'W', long, default_value_t = 10)]
    width: usize,

    /// Neurons in the first hidden layer
    #[arg(long, default_value_t = 32)]
    first_layer: usize,

    /// Neurons in the second hidden layer
    #[arg(long, default_value_t = 16)]
    second_layer: usize,

    #[arg(long, default_value_t = 10_000)]
    episodes: usize,

    /// Run directory name under models/
    #[arg(long, default_value = "model")]
    name: String,

    /// Model file to start from
    #[arg(long)]
    load_model: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = EncoderKind::Rays)]
    encoder: EncoderKind,

    #[arg(long, value_enum, default_value_t = Exploration::Uniform)]
    exploration: Exploration,

    /// Blend the target network every step with this rate instead of hard copies
    #[arg(long)]
    soft_tau: Option<f32>,

    /// Print what the agent sees before every move
    #[arg(long)]
    show_vision: bool,
}

impl Options {
    fn agent_config(&self) -> AgentConfig {
        let defaults = AgentConfig::default();
        AgentConfig {
            first_layer: self.first_layer,
            second_layer: self.second_layer,
            encoder: self.encoder,
            exploration: self.exploration,
            target_sync: self.soft_tau.map_or(defaults.target_sync, |tau| TargetSync::Soft { tau }),
            seed: self.seed,
            ..defaults
        }
    }

    fn run_config(&self) -> RunConfig {
        RunConfig {
            episodes: self.episodes,
            run_dir: PathBuf::from("models").join(&self.name),
            show_vision: self.show_vision,
            ..RunConfig::default()
        }
    }

    fn board(&self) -> Result<Board> {
        let board = match self.seed {
            Some(seed) => Board::with_seed(self.height, self.width, seed),
            None => Board::new(self.height, self.width),
        };
        board.with_context(|| {
            format!("board must be {MIN_SIDE}-{MAX_HEIGHT} rows by {MIN_SIDE}-{MAX_WIDTH} columns")
        })
    }

    fn agent(&self) -> Result<Agent> {
        let config = self.agent_config();
        match &self.load_model {
            Some(path) => Agent::load(path, config).context("refusing to continue without the requested model"),
            None => Agent::new(config).context("invalid agent configuration"),
        }
    }
}

fn stop_flag() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        handler_stop.store(true, Ordering::Relaxed);
    })
    .context("failed to install the interrupt handler")?;
    Ok(stop)
}

fn train(options: Options) -> Result<()> {
    let board = options.board()?;
    let agent = options.agent()?;
    let run = options.run_config();
    let mut trainer = Trainer::new(agent, board, RewardConfig::default(), run, stop_flag()?);

    let report = trainer.train().context("training failed")?;

    match report.end {
        TrainingEnd::Completed => info!(episodes = report.episodes, "training finished"),
        TrainingEnd::NoImprovement => info!(episodes = report.episodes, "training stopped early"),
        TrainingEnd::Interrupted => warn!(episodes = report.episodes, "training interrupted"),
    }
    info!("Best average length: {:.2}", report.best_average);
    Ok(())
}

fn evaluate(options: Options) -> Result<()> {
    if options.load_model.is_none() {
        warn!("evaluating an untrained agent, pass --load-model to evaluate a saved one");
    }
    let board = options.board()?;
    let agent = options.agent()?;
    let run = options.run_config();
    let mut trainer = Trainer::new(agent, board, RewardConfig::default(), run, stop_flag()?);

    let summary = trainer.run_evaluation().context("evaluation failed")?;

    println!("\nEvaluation Results:");
    println!("Total games played: {}", summary.games);
    println!("Average snake length: {:.2}", summary.average_length);
    println!("Maximum length achieved: {}", summary.max_length);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Train(options) => train(options),
        Command::Evaluate(options) => evaluate(options),
    }
}
