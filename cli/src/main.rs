//! Command-line driver for the mind association engine.
//!
//! Loads a directory of Markdown outlines, learns it, and answers:
//! - associate: Notes associated with a note or an outline
//! - search: Notes associated with free text
//! - stats: What was learned
//!
//! Configuration via environment:
//! - MIND_MEMORY: Directory of Markdown outlines (default: current directory)
//! - MIND_AA_ALGORITHM, MIND_LEADERBOARD_SIZE, ...: Engine tuning
//! - RUST_LOG / MIND_LOG_LEVEL: Log filter (default: warn)

mod commands;
mod loader;

use clap::{Parser, Subcommand};
use mind_aa::{AaAlgorithm, AaConfig};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use commands::{associate::AssociateArgs, search::SearchArgs, stats::StatsArgs};

/// Mind association CLI
///
/// Ask which notes relate to each other. Designed for both tooling (JSON
/// output) and humans (--human flag for formatted output).
#[derive(Parser)]
#[command(name = "mind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Directory of Markdown outlines
    #[arg(short = 'm', long, env = "MIND_MEMORY", default_value = ".", global = true)]
    memory: PathBuf,

    /// Association algorithm (bow, weighted-fts); overrides MIND_AA_ALGORITHM
    #[arg(short = 'a', long, global = true)]
    algorithm: Option<AaAlgorithm>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "MIND_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Notes associated with a note or an outline
    Associate(AssociateArgs),

    /// Notes associated with free text
    Search(SearchArgs),

    /// Show what the mind learned
    Stats(StatsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = match AaConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let config = match cli.algorithm {
        Some(algorithm) => config.with_algorithm(algorithm),
        None => config,
    };

    let dir = cli.memory.as_path();
    let result = match cli.command {
        Commands::Associate(args) => commands::associate::execute(dir, config, cli.human, args).await,
        Commands::Search(args) => commands::search::execute(dir, config, cli.human, args).await,
        Commands::Stats(args) => commands::stats::execute(dir, config, cli.human, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber, logging to stderr so JSON output stays
/// clean.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
