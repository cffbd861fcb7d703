//! SEARCH command - Notes associated with free text.
//!
//! Always answered by weighted full-text search: the phrase first, then its
//! individual words when the phrase matches nothing.

use anyhow::{Result, anyhow};
use clap::Args;
use mind_aa::{AaAlgorithm, AaConfig, AssociatedNotes};
use std::path::Path;

use super::{AssociationReport, awaken, output};

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Words to search for
    #[arg(required = true, num_args = 1..)]
    pub words: Vec<String>,

    /// Title of the note being edited; dropped when it is the only match
    #[arg(long)]
    pub exclude: Option<String>,
}

/// Execute the search command.
pub async fn execute(dir: &Path, config: AaConfig, human: bool, args: SearchArgs) -> Result<()> {
    let config = config.with_algorithm(AaAlgorithm::WeightedFts);
    let (memory, mind) = awaken(dir, config).await?;

    let mut request = AssociatedNotes::for_words(args.words.join(" "));
    if let Some(title) = &args.exclude {
        let note = memory
            .find_note_by_title(title)
            .ok_or_else(|| anyhow!("no note titled '{}'", title))?;
        request.note = Some(note);
    }

    let (associated, outcome) = mind.associate(request).await?;
    mind.shutdown().await;

    output(&AssociationReport::new(associated, &outcome), human)
}
