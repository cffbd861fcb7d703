//! Association feature vector for a pair of notes.
//!
//! Features are computed per pair when the matrix is filled and reduced to
//! one scalar by [`AssociationFeatures::metric`]. They are never stored.

use crate::lexicon::Lexicon;
use crate::similarity::{similarity_by_tags, similarity_by_titles, similarity_by_words};
use crate::word_frequency::WordFrequencyList;
use mind_core::Note;

const WEIGHT_TYPE: f32 = 0.1;
const WEIGHT_SAME_OUTLINE: f32 = 0.05;
const WEIGHT_TAGS: f32 = 0.2;
const WEIGHT_TITLES: f32 = 0.2;
const WEIGHT_DESCRIPTION: f32 = 0.45;
const WEIGHT_SAME_TARGET_RELS: f32 = 0.1;

/// Features of one note pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AssociationFeatures {
    /// Notes link to each other. Not tracked yet, always false.
    pub have_mutual_rel: bool,
    pub type_matches: bool,
    pub same_outline: bool,
    pub similarity_by_tags: f32,
    pub similarity_by_titles: f32,
    pub similarity_by_description: f32,
    /// Share of relationships pointing at the same targets. Not tracked yet, always 0.
    pub similarity_by_same_target_rels: f32,
}

impl AssociationFeatures {
    /// Computes the features of two notes given their document vectors.
    pub fn assess(
        a: &Note,
        a_words: &WordFrequencyList,
        b: &Note,
        b_words: &WordFrequencyList,
        lexicon: &Lexicon,
        word_relevancy_threshold: usize,
    ) -> Self {
        Self {
            have_mutual_rel: false,
            type_matches: a.note_type == b.note_type,
            same_outline: a.outline_id == b.outline_id,
            similarity_by_tags: similarity_by_tags(&a.tags, &b.tags),
            similarity_by_titles: similarity_by_titles(&a.title, &b.title),
            similarity_by_description: similarity_by_words(
                a_words,
                b_words,
                lexicon,
                word_relevancy_threshold,
            ),
            similarity_by_same_target_rels: 0.0,
        }
    }

    /// Weighted sum of the features.
    ///
    /// Stays within `[0, 1]` while same-target relationships are untracked.
    /// Mutual relationship carries no weight.
    pub fn metric(&self) -> f32 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };

        WEIGHT_TYPE * flag(self.type_matches)
            + WEIGHT_SAME_OUTLINE * flag(self.same_outline)
            + WEIGHT_TAGS * self.similarity_by_tags
            + WEIGHT_TITLES * self.similarity_by_titles
            + WEIGHT_DESCRIPTION * self.similarity_by_description
            + WEIGHT_SAME_TARGET_RELS * self.similarity_by_same_target_rels
    }
}
