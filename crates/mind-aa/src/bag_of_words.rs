//! Corpus index: one word vector per note.

use crate::lexicon::Lexicon;
use crate::word_frequency::WordFrequencyList;
use mind_core::NoteId;
use std::collections::HashMap;

/// Map from note to its document vector.
///
/// Rebuilt wholesale on every learn; never updated for a single note.
#[derive(Debug, Clone, Default)]
pub struct BagOfWords {
    documents: HashMap<NoteId, WordFrequencyList>,
}

impl BagOfWords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the vector of a note, replacing any previous one.
    pub fn insert(&mut self, id: NoteId, words: WordFrequencyList) {
        self.documents.insert(id, words);
    }

    pub fn get(&self, id: &NoteId) -> Option<&WordFrequencyList> {
        self.documents.get(id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.documents.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Orders every vector by the lexicon weights.
    ///
    /// Must run after [`Lexicon::recalculate_weights`].
    pub fn reorder_doc_vectors_by_weight(&mut self, lexicon: &Lexicon) {
        for words in self.documents.values_mut() {
            words.reorder_by_weight(lexicon);
        }
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }
}
