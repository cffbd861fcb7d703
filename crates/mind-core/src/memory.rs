//! The memory contract: where the engine gets its corpus from.
//!
//! Persistence (files, formats, repositories) is out of scope for the engine.
//! It only needs a full snapshot of notes for learning and the outlines for
//! outline-aware full-text scoring.

use crate::types::{Note, NoteId, Outline, OutlineId};
use std::sync::RwLock;

/// Read access to the note corpus.
pub trait Memory: Send + Sync {
    /// Returns every outline with its notes.
    fn outlines(&self) -> Vec<Outline>;

    /// Returns every note across all outlines, in a stable order.
    ///
    /// The default implementation flattens [`outlines`](Self::outlines) in
    /// outline order, notes in document order.
    fn all_notes(&self) -> Vec<Note> {
        self.outlines()
            .into_iter()
            .flat_map(|outline| outline.notes)
            .collect()
    }

    /// Returns the number of notes in memory.
    fn notes_count(&self) -> usize {
        self.outlines().iter().map(|o| o.notes.len()).sum()
    }
}

/// In-process memory backed by a vector of outlines.
///
/// Used by tests, benchmarks and the CLI loader.
#[derive(Debug, Default)]
pub struct InMemoryMemory {
    outlines: RwLock<Vec<Outline>>,
}

impl InMemoryMemory {
    /// Creates an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a memory pre-populated with outlines.
    pub fn with_outlines(outlines: Vec<Outline>) -> Self {
        Self {
            outlines: RwLock::new(outlines),
        }
    }

    /// Adds (or replaces, by ID) an outline.
    pub fn remember(&self, outline: Outline) {
        if let Ok(mut outlines) = self.outlines.write() {
            match outlines.iter_mut().find(|o| o.id == outline.id) {
                Some(existing) => *existing = outline,
                None => outlines.push(outline),
            }
        }
    }

    /// Removes an outline. Returns true if it was present.
    pub fn forget(&self, id: &OutlineId) -> bool {
        if let Ok(mut outlines) = self.outlines.write() {
            let before = outlines.len();
            outlines.retain(|o| &o.id != id);
            return outlines.len() != before;
        }
        false
    }

    /// Finds a note by ID across all outlines.
    pub fn find_note(&self, id: &NoteId) -> Option<Note> {
        let outlines = self.outlines.read().ok()?;
        outlines.iter().find_map(|o| o.note(id).cloned())
    }

    /// Finds the first note whose title matches, ignoring case.
    pub fn find_note_by_title(&self, title: &str) -> Option<Note> {
        let outlines = self.outlines.read().ok()?;
        outlines
            .iter()
            .flat_map(|o| o.notes.iter())
            .find(|n| n.title.eq_ignore_ascii_case(title))
            .cloned()
    }
}

impl Memory for InMemoryMemory {
    fn outlines(&self) -> Vec<Outline> {
        self.outlines.read().map(|o| o.clone()).unwrap_or_default()
    }

    fn notes_count(&self) -> usize {
        self.outlines
            .read()
            .map(|o| o.iter().map(|outline| outline.notes.len()).sum())
            .unwrap_or(0)
    }
}
