//! Command implementations for the mind CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable and JSON output formatting

pub mod associate;
pub mod search;
pub mod stats;

use anyhow::{Context, Result};
use colored::Colorize;
use mind_aa::{
    AaConfig, AssociatedNotes, AssociationOutcome, AssociationSource, Mind, Unavailable,
};
use mind_core::InMemoryMemory;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::loader;

/// Loads the memory under `dir` and learns it.
pub async fn awaken(dir: &Path, config: AaConfig) -> Result<(Arc<InMemoryMemory>, Mind)> {
    let memory = Arc::new(
        loader::load_memory(dir).with_context(|| format!("loading {}", dir.display()))?,
    );
    let mut mind = Mind::new(memory.clone(), config)?;
    if !mind.learn().await? {
        anyhow::bail!("the mind could not learn {}", dir.display());
    }
    Ok((memory, mind))
}

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Associations for one request plus how the query ended.
#[derive(Debug, Serialize)]
pub struct AssociationReport {
    pub status: &'static str,
    #[serde(flatten)]
    pub associated: AssociatedNotes,
}

impl AssociationReport {
    pub fn new(associated: AssociatedNotes, outcome: &AssociationOutcome) -> Self {
        let status = match outcome {
            AssociationOutcome::Found(_) => "found",
            AssociationOutcome::InProgress => "in_progress",
            AssociationOutcome::Unavailable(Unavailable::EmptyCorpus) => "empty_corpus",
            AssociationOutcome::Unavailable(Unavailable::NotIndexed) => "not_indexed",
            AssociationOutcome::Unavailable(Unavailable::NoMatches) => "no_matches",
        };
        Self { status, associated }
    }
}

impl HumanReadable for AssociationReport {
    fn print_human(&self) {
        let source = match &self.associated.source {
            AssociationSource::Note { title, .. } => format!("note '{}'", title),
            AssociationSource::Outline { title, .. } => format!("outline '{}'", title),
            AssociationSource::Words { words } => format!("words '{}'", words),
        };

        println!("{} {}", "Associations for".green().bold(), source.bold());
        println!("{}", "=".repeat(60));

        if self.associated.is_empty() {
            println!("  {}", format!("No associations ({})", self.status).dimmed());
            return;
        }

        for (rank, association) in self.associated.associations.iter().enumerate() {
            println!(
                "  {:>2}. {} {}",
                rank + 1,
                format!("{:.3}", association.score).yellow(),
                truncate(&association.note.title, 48)
            );
        }
    }
}

/// Truncate a string for display, adding ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
