//! Pairwise similarity measures used as association features.
//!
//! All measures are intersection-over-union ratios in `[0, 1]`. A zero
//! union short-circuits to 0 before dividing.

use crate::lexicon::{Lexicon, tokenize};
use crate::word_frequency::WordFrequencyList;
use std::collections::HashSet;

/// Weighted similarity of two document vectors.
///
/// Only the `threshold` heaviest words of each side are considered; long
/// tails of rare-but-irrelevant words would otherwise drown the overlap.
///
/// Two passes: the head of `a` feeds the union and, when shared with `b`,
/// the intersection; the head of `b` then adds the words not yet counted.
pub fn similarity_by_words(
    a: &WordFrequencyList,
    b: &WordFrequencyList,
    lexicon: &Lexicon,
    threshold: usize,
) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mut union_weight = 0.0f32;
    let mut intersection_weight = 0.0f32;
    let mut counted: HashSet<&str> = HashSet::new();

    for word in a.words_by_weight().iter().take(threshold) {
        let weight = lexicon.weight(word);
        union_weight += weight;
        if b.contains(word) {
            intersection_weight += weight;
            counted.insert(word.as_str());
        }
    }

    for word in b.words_by_weight().iter().take(threshold) {
        if counted.contains(word.as_str()) {
            continue;
        }
        let weight = lexicon.weight(word);
        union_weight += weight;
        if a.contains(word) {
            intersection_weight += weight;
        }
    }

    ratio(intersection_weight, union_weight)
}

/// Unweighted Jaccard similarity of two tag lists.
///
/// Two untagged notes are considered fully similar; one tagged and one
/// untagged note share nothing.
pub fn similarity_by_tags(a: &[String], b: &[String]) -> f32 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let a: HashSet<&str> = a.iter().map(String::as_str).collect();
            let b: HashSet<&str> = b.iter().map(String::as_str).collect();
            jaccard(&a, &b)
        }
    }
}

/// Unweighted Jaccard similarity of two titles' word sets.
pub fn similarity_by_titles(a: &str, b: &str) -> f32 {
    let a_tokens = tokenize(a, None);
    let b_tokens = tokenize(b, None);
    if a_tokens.is_empty() || b_tokens.is_empty() {
        return 0.0;
    }

    let a: HashSet<&str> = a_tokens.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b_tokens.iter().map(String::as_str).collect();
    jaccard(&a, &b)
}

fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f32 {
    let intersection = a.intersection(b).count() as f32;
    let union = a.union(b).count() as f32;
    ratio(intersection, union)
}

fn ratio(intersection: f32, union: f32) -> f32 {
    if union <= 0.0 {
        return 0.0;
    }
    intersection / union
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn corpus(docs: &[Vec<String>]) -> (Lexicon, Vec<WordFrequencyList>) {
        let mut lexicon = Lexicon::new();
        for d in docs {
            lexicon.add_document(d);
        }
        lexicon.recalculate_weights();
        let lists = docs
            .iter()
            .map(|d| {
                let mut wfl = WordFrequencyList::from_tokens(d);
                wfl.reorder_by_weight(&lexicon);
                wfl
            })
            .collect();
        (lexicon, lists)
    }

    #[test]
    fn identical_vectors_are_fully_similar() {
        let (lexicon, lists) = corpus(&[
            doc(&["rust", "ownership", "borrow", "rust"]),
            doc(&["python", "garbage"]),
        ]);
        assert_eq!(similarity_by_words(&lists[0], &lists[0], &lexicon, 10), 1.0);
        assert_eq!(similarity_by_words(&lists[1], &lists[1], &lexicon, 1), 1.0);
    }

    #[test]
    fn disjoint_vectors_share_nothing() {
        let (lexicon, lists) = corpus(&[doc(&["rust", "borrow"]), doc(&["python", "garbage"])]);
        assert_eq!(similarity_by_words(&lists[0], &lists[1], &lexicon, 10), 0.0);
    }

    #[test]
    fn partial_overlap_is_between_zero_and_one() {
        let (lexicon, lists) = corpus(&[
            doc(&["rust", "borrow", "checker"]),
            doc(&["rust", "borrow", "lifetime"]),
            doc(&["python", "garbage"]),
        ]);
        let sim = similarity_by_words(&lists[0], &lists[1], &lexicon, 10);
        assert!(sim > 0.0 && sim < 1.0);

        // symmetric
        let back = similarity_by_words(&lists[1], &lists[0], &lexicon, 10);
        assert!((sim - back).abs() < 1e-6);
    }

    #[test]
    fn empty_vector_is_zero() {
        let (lexicon, lists) = corpus(&[doc(&["rust"])]);
        let empty = WordFrequencyList::new();
        assert_eq!(similarity_by_words(&lists[0], &empty, &lexicon, 10), 0.0);
        assert_eq!(similarity_by_words(&empty, &empty, &lexicon, 10), 0.0);
    }

    #[test]
    fn zero_weights_do_not_divide_by_zero() {
        let lexicon = Lexicon::new();
        let a = WordFrequencyList::from_tokens(&doc(&["rust"]));
        assert_eq!(similarity_by_words(&a, &a, &lexicon, 10), 0.0);
    }

    #[test]
    fn tags_similarity() {
        let none: Vec<String> = vec![];
        assert_eq!(similarity_by_tags(&none, &none), 1.0);
        assert_eq!(similarity_by_tags(&doc(&["ai"]), &none), 0.0);
        assert_eq!(similarity_by_tags(&none, &doc(&["ai"])), 0.0);
        assert_eq!(similarity_by_tags(&doc(&["ai", "ml"]), &doc(&["ml", "ai"])), 1.0);
        assert!((similarity_by_tags(&doc(&["important", "ai"]), &doc(&["cool", "ai"])) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn titles_similarity() {
        assert_eq!(similarity_by_titles("Rust Ownership", "ownership in Rust"), 2.0 / 3.0);
        assert_eq!(similarity_by_titles("Rust", ""), 0.0);
        assert_eq!(similarity_by_titles("Rust", "Python"), 0.0);
    }
}
