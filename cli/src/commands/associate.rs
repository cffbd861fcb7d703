//! ASSOCIATE command - Notes associated with a note or an outline.

use anyhow::{Result, anyhow};
use clap::Args;
use mind_aa::{AaConfig, AssociatedNotes};
use mind_core::{InMemoryMemory, Memory, Note, Outline};
use std::path::Path;

use super::{AssociationReport, awaken, output};

/// Arguments for the associate command.
#[derive(Args)]
pub struct AssociateArgs {
    /// Title of the note to associate (case-insensitive)
    pub title: Option<String>,

    /// Outline title; restricts the note lookup, or associates the outline
    /// itself when no note title is given
    #[arg(short = 'o', long)]
    pub outline: Option<String>,
}

fn find_outline(memory: &InMemoryMemory, title: &str) -> Option<Outline> {
    memory
        .outlines()
        .into_iter()
        .find(|o| o.title.eq_ignore_ascii_case(title))
}

fn find_note(memory: &InMemoryMemory, title: &str, outline: Option<&Outline>) -> Option<Note> {
    match outline {
        Some(outline) => outline
            .notes
            .iter()
            .find(|n| n.title.eq_ignore_ascii_case(title))
            .cloned(),
        None => memory.find_note_by_title(title),
    }
}

/// Resolves the arguments to a presentation request.
fn request(memory: &InMemoryMemory, args: &AssociateArgs) -> Result<AssociatedNotes> {
    let outline = match &args.outline {
        Some(title) => Some(
            find_outline(memory, title).ok_or_else(|| anyhow!("no outline titled '{}'", title))?,
        ),
        None => None,
    };

    match (&args.title, outline) {
        (Some(title), outline) => find_note(memory, title, outline.as_ref())
            .map(|note| AssociatedNotes::for_note(&note))
            .ok_or_else(|| anyhow!("no note titled '{}'", title)),
        (None, Some(outline)) => Ok(AssociatedNotes::for_outline(&outline)),
        (None, None) => Err(anyhow!("give a note title, an --outline, or both")),
    }
}

/// Execute the associate command.
pub async fn execute(dir: &Path, config: AaConfig, human: bool, args: AssociateArgs) -> Result<()> {
    let (memory, mind) = awaken(dir, config).await?;
    let request = request(&memory, &args)?;

    let (associated, outcome) = mind.associate(request).await?;
    mind.shutdown().await;

    output(&AssociationReport::new(associated, &outcome), human)
}
