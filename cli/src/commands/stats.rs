//! STATS command - What the mind learned from a memory directory.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mind_aa::{AaConfig, Assessment, MindStats};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

use super::{HumanReadable, awaken, output};

/// Arguments for the stats command.
#[derive(Args)]
pub struct StatsArgs {
    /// Fill the whole association matrix before reporting
    #[arg(long)]
    pub precalculate: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    #[serde(flatten)]
    pub mind: MindStats,
    /// Milliseconds spent filling the matrix, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precalculate_ms: Option<u128>,
}

impl HumanReadable for StatsReport {
    fn print_human(&self) {
        let mind = &self.mind;

        println!("{}", "Mind Statistics".green().bold());
        println!("{}", "=".repeat(60));
        println!("  {} {}", "State:".cyan(), mind.state);
        println!("  {} {}", "Algorithm:".cyan(), mind.algorithm);
        println!("  {} {}", "Notes in memory:".cyan(), mind.memory_notes);
        println!("  {} {}", "Indexed notes:".cyan(), mind.assessment.indexed_notes);
        println!("  {} {}", "Lexicon words:".cyan(), mind.assessment.lexicon_words);
        println!("  {} {}", "Matrix rows done:".cyan(), mind.assessment.rows_done);
        println!(
            "  {} {}",
            "Cached leaderboards:".cyan(),
            mind.assessment.cached_leaderboards
        );
        println!(
            "  {} {} spawned, {} completed, {} failed",
            "Workers:".cyan(),
            mind.pool.spawned,
            mind.pool.completed,
            mind.pool.failed
        );
        if let Some(ms) = self.precalculate_ms {
            println!("  {} {} ms", "Precalculated in:".cyan(), ms);
        }
    }
}

/// Execute the stats command.
pub async fn execute(dir: &Path, config: AaConfig, human: bool, args: StatsArgs) -> Result<()> {
    let (_memory, mind) = awaken(dir, config).await?;

    let precalculate_ms = match (args.precalculate, mind.assessment()) {
        (true, Assessment::Bow(bow)) => {
            let started = Instant::now();
            bow.precalculate_aa()?;
            Some(started.elapsed().as_millis())
        }
        _ => None,
    };

    let report = StatsReport {
        mind: mind.stats(),
        precalculate_ms,
    };
    mind.shutdown().await;

    output(&report, human)
}
