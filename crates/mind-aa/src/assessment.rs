//! The association assessment contract and its result types.
//!
//! Two strategies answer the same questions:
//!
//! - [`BowAssessment`]: bag-of-words similarity matrix with cached leaderboards
//! - [`WeightedFtsAssessment`]: weighted full-text search with a word fallback
//!
//! [`Assessment`] dispatches between them. Every query returns an
//! [`AssessmentFuture`]; a ready future is returned whenever the answer is
//! known without background work.

use crate::bow::BowAssessment;
use crate::cache::CacheStats;
use crate::config::{AaAlgorithm, AaConfig};
use crate::error::AaError;
use crate::fts::WeightedFtsAssessment;
use crate::lifecycle::MindStatus;
use crate::pool::WorkerPool;
use futures::future::BoxFuture;
use mind_core::{Memory, Note, NoteId, Outline, OutlineId, ResourceType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Future returned by assessment operations.
pub type AssessmentFuture<T> = BoxFuture<'static, Result<T, AaError>>;

/// One associated note with its score.
///
/// The note is a copy; it never aliases engine storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub note: Note,
    pub score: f32,
}

/// Why no leaderboard is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unavailable {
    /// Nothing has been learned, or the corpus has no notes.
    EmptyCorpus,
    /// The note was not part of the learned corpus.
    NotIndexed,
    /// The note is indexed but nothing relates to it.
    NoMatches,
}

/// Answer to an association query.
#[derive(Debug, Clone, PartialEq)]
pub enum AssociationOutcome {
    /// Leaderboard, best first. Never empty.
    Found(Vec<Association>),
    /// Being computed elsewhere; ask again later.
    InProgress,
    /// No associations available.
    Unavailable(Unavailable),
}

impl AssociationOutcome {
    /// Wraps a leaderboard, mapping an empty one to `NoMatches`.
    pub fn from_leaderboard(associations: Vec<Association>) -> Self {
        if associations.is_empty() {
            Self::Unavailable(Unavailable::NoMatches)
        } else {
            Self::Found(associations)
        }
    }

    /// True when a leaderboard was found.
    pub fn found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// The leaderboard, empty unless found.
    pub fn associations(&self) -> &[Association] {
        match self {
            Self::Found(associations) => associations,
            _ => &[],
        }
    }

    pub fn into_associations(self) -> Vec<Association> {
        match self {
            Self::Found(associations) => associations,
            _ => Vec::new(),
        }
    }
}

/// What an association query started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssociationSource {
    Note { id: NoteId, title: String },
    Outline { id: OutlineId, title: String },
    Words { words: String },
}

impl AssociationSource {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Note { .. } => ResourceType::Note,
            Self::Outline { .. } => ResourceType::Outline,
            Self::Words { .. } => ResourceType::Word,
        }
    }
}

/// Associations ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociatedNotes {
    pub source: AssociationSource,
    /// The note the query was made for, if any.
    pub note: Option<Note>,
    pub associations: Vec<Association>,
}

impl AssociatedNotes {
    pub fn for_note(note: &Note) -> Self {
        Self {
            source: AssociationSource::Note {
                id: note.id,
                title: note.title.clone(),
            },
            note: Some(note.clone()),
            associations: Vec::new(),
        }
    }

    pub fn for_outline(outline: &Outline) -> Self {
        Self {
            source: AssociationSource::Outline {
                id: outline.id,
                title: outline.title.clone(),
            },
            note: Some(outline.descriptor_note()),
            associations: Vec::new(),
        }
    }

    pub fn for_words(words: impl Into<String>) -> Self {
        Self {
            source: AssociationSource::Words {
                words: words.into(),
            },
            note: None,
            associations: Vec::new(),
        }
    }

    /// Copies the leaderboard of an outcome in.
    #[must_use]
    pub fn with_outcome(mut self, outcome: &AssociationOutcome) -> Self {
        self.associations = outcome.associations().to_vec();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }

    /// Same source kind and the same note, outline or words.
    pub fn same_source(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Summary of an assessment's learned state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssessmentStats {
    pub indexed_notes: usize,
    pub lexicon_words: usize,
    pub rows_done: usize,
    pub cached_leaderboards: usize,
    pub leaderboards_in_progress: usize,
}

impl AssessmentStats {
    pub(crate) fn with_cache(mut self, cache: CacheStats) -> Self {
        self.cached_leaderboards = cache.cached;
        self.leaderboards_in_progress = cache.in_progress;
        self
    }
}

/// The configured assessment strategy.
#[derive(Debug)]
pub enum Assessment {
    Bow(BowAssessment),
    WeightedFts(WeightedFtsAssessment),
}

impl Assessment {
    /// Creates the strategy selected by `config.algorithm`.
    pub fn new(
        config: AaConfig,
        memory: Arc<dyn Memory>,
        status: Arc<MindStatus>,
        pool: WorkerPool,
    ) -> Self {
        match config.algorithm {
            AaAlgorithm::Bow => Self::Bow(BowAssessment::new(config, memory, status, pool)),
            AaAlgorithm::WeightedFts => {
                Self::WeightedFts(WeightedFtsAssessment::new(config, memory, status, pool))
            }
        }
    }

    pub fn algorithm(&self) -> AaAlgorithm {
        match self {
            Self::Bow(_) => AaAlgorithm::Bow,
            Self::WeightedFts(_) => AaAlgorithm::WeightedFts,
        }
    }

    /// (Re)builds corpus-derived structures.
    pub fn dream(&mut self) -> AssessmentFuture<bool> {
        match self {
            Self::Bow(bow) => bow.dream(),
            Self::WeightedFts(fts) => fts.dream(),
        }
    }

    /// Leaderboard of notes associated with `note`.
    pub fn associated_notes(&self, note: &Note) -> AssessmentFuture<AssociationOutcome> {
        match self {
            Self::Bow(bow) => bow.associated_notes(note),
            Self::WeightedFts(fts) => fts.associated_notes(note),
        }
    }

    /// Notes associated with free text, e.g. words typed in an editor.
    ///
    /// `self_note` is the note being edited; it is dropped when it would be
    /// the only result.
    pub fn associated_notes_for_words(
        &self,
        words: &str,
        self_note: Option<&Note>,
    ) -> AssessmentFuture<AssociationOutcome> {
        match self {
            Self::Bow(bow) => bow.associated_notes_for_words(words, self_note),
            Self::WeightedFts(fts) => fts.associated_notes_for_words(words, self_note),
        }
    }

    /// Drops derived structures, keeps configuration.
    pub fn sleep(&mut self) {
        match self {
            Self::Bow(bow) => bow.sleep(),
            Self::WeightedFts(fts) => fts.sleep(),
        }
    }

    /// Sleeps and discards the similarity matrix.
    pub fn amnesia(&mut self) {
        match self {
            Self::Bow(bow) => bow.amnesia(),
            Self::WeightedFts(fts) => fts.amnesia(),
        }
    }

    pub fn stats(&self) -> AssessmentStats {
        match self {
            Self::Bow(bow) => bow.stats(),
            Self::WeightedFts(fts) => fts.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn association(title: &str, score: f32) -> Association {
        Association {
            note: Note::builder().title(title).build(),
            score,
        }
    }

    #[test]
    fn empty_leaderboard_is_no_matches() {
        let outcome = AssociationOutcome::from_leaderboard(Vec::new());
        assert_eq!(outcome, AssociationOutcome::Unavailable(Unavailable::NoMatches));
        assert!(!outcome.found());
        assert!(outcome.associations().is_empty());
    }

    #[test]
    fn found_exposes_leaderboard() {
        let outcome = AssociationOutcome::from_leaderboard(vec![association("Rust", 0.5)]);
        assert!(outcome.found());
        assert_eq!(outcome.associations().len(), 1);
        assert_eq!(outcome.into_associations()[0].note.title, "Rust");
    }

    #[test]
    fn in_progress_is_not_found() {
        assert!(!AssociationOutcome::InProgress.found());
        assert!(AssociationOutcome::InProgress.is_in_progress());
    }

    #[test]
    fn associated_notes_sources() {
        let note = Note::builder().title("Ownership").build();
        let for_note = AssociatedNotes::for_note(&note);
        assert_eq!(for_note.source.resource_type(), ResourceType::Note);
        assert!(for_note.is_empty());

        let outline = Outline::new("Rust");
        let for_outline = AssociatedNotes::for_outline(&outline);
        assert_eq!(for_outline.source.resource_type(), ResourceType::Outline);
        assert_eq!(for_outline.note.as_ref().map(|n| n.title.as_str()), Some("Rust"));

        let words = AssociatedNotes::for_words("borrow checker");
        assert_eq!(words.source.resource_type(), ResourceType::Word);
        assert!(words.note.is_none());
    }

    #[test]
    fn same_source_compares_identity() {
        let note = Note::builder().title("Ownership").build();
        let a = AssociatedNotes::for_note(&note);
        let b = AssociatedNotes::for_note(&note)
            .with_outcome(&AssociationOutcome::Found(vec![association("Lifetimes", 0.3)]));
        let c = AssociatedNotes::for_note(&Note::builder().title("Ownership").build());

        assert!(a.same_source(&b));
        assert!(!a.same_source(&c));
        assert!(!a.same_source(&AssociatedNotes::for_words("Ownership")));
        assert_eq!(b.associations.len(), 1);
    }

    #[test]
    fn associated_notes_serializes() {
        let json = serde_json::to_value(AssociatedNotes::for_words("fox")).unwrap();
        assert_eq!(json["source"]["type"], "words");
        assert_eq!(json["source"]["words"], "fox");
    }
}
