//! Per-document sparse word vectors.
//!
//! A [`WordFrequencyList`] maps each word of one document to its local count.
//! Once the corpus lexicon has weights, the list can be ordered so that the
//! most relevant words come first; similarity only looks at the head of
//! that order.

use crate::lexicon::Lexicon;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Word -> count vector of a single document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordFrequencyList {
    counts: HashMap<String, u32>,
    /// Every word, by relevance once `reorder_by_weight` ran, else by
    /// local count then alphabetically.
    by_weight: Vec<String>,
}

impl WordFrequencyList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from document tokens.
    pub fn from_tokens(tokens: &[String]) -> Self {
        let mut counts = HashMap::new();
        for token in tokens {
            *counts.entry(token.clone()).or_insert(0) += 1;
        }
        Self::with_counts(counts)
    }

    fn with_counts(counts: HashMap<String, u32>) -> Self {
        let mut list = Self {
            counts,
            by_weight: Vec::new(),
        };
        list.reorder_by_count();
        list
    }

    /// Increments the count of a word and returns the new count.
    ///
    /// Replaces any relevance order computed earlier with the count order.
    pub fn add(&mut self, word: &str) -> u32 {
        let count = {
            let count = self.counts.entry(word.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        self.reorder_by_count();
        count
    }

    /// Returns the local count of a word.
    pub fn count(&self, word: &str) -> u32 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates `(word, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(w, c)| (w.as_str(), *c))
    }

    /// Orders words by `count * lexicon weight`, heaviest first, ties by word.
    pub fn reorder_by_weight(&mut self, lexicon: &Lexicon) {
        let mut scored: Vec<(&String, f32)> = self
            .counts
            .iter()
            .map(|(word, count)| (word, *count as f32 * lexicon.weight(word)))
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        self.by_weight = scored.into_iter().map(|(w, _)| w.clone()).collect();
    }

    fn reorder_by_count(&mut self) {
        let mut words: Vec<(&String, u32)> = self.counts.iter().map(|(w, c)| (w, *c)).collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        self.by_weight = words.into_iter().map(|(w, _)| w.clone()).collect();
    }

    /// Returns words most relevant first.
    ///
    /// Without a relevance order the words come by local count, then
    /// alphabetically.
    pub fn words_by_weight(&self) -> &[String] {
        &self.by_weight
    }

    /// Words present in either list; counts are summed.
    pub fn union(a: &Self, b: &Self) -> Self {
        let mut counts = a.counts.clone();
        for (word, count) in &b.counts {
            *counts.entry(word.clone()).or_insert(0) += count;
        }
        Self::with_counts(counts)
    }

    /// Words present in both lists; counts are the smaller of the two.
    pub fn intersection(a: &Self, b: &Self) -> Self {
        let counts = a
            .counts
            .iter()
            .filter_map(|(word, count)| b.counts.get(word).map(|other| (word.clone(), *count.min(other))))
            .collect();
        Self::with_counts(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(words: &[&str]) -> WordFrequencyList {
        let tokens: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        WordFrequencyList::from_tokens(&tokens)
    }

    #[test]
    fn add_counts_occurrences() {
        let mut wfl = WordFrequencyList::new();
        assert_eq!(wfl.add("cat"), 1);
        assert_eq!(wfl.add("cat"), 2);
        assert_eq!(wfl.add("dog"), 1);

        assert_eq!(wfl.len(), 2);
        assert_eq!(wfl.count("cat"), 2);
        assert_eq!(wfl.count("bird"), 0);
        assert!(wfl.contains("dog"));
    }

    #[test]
    fn union_sums_counts() {
        let a = list(&["cat", "cat", "dog"]);
        let b = list(&["cat", "bird"]);
        let u = WordFrequencyList::union(&a, &b);

        assert_eq!(u.len(), 3);
        assert_eq!(u.count("cat"), 3);
        assert_eq!(u.count("bird"), 1);
    }

    #[test]
    fn intersection_keeps_shared_words() {
        let a = list(&["cat", "cat", "dog"]);
        let b = list(&["cat", "bird"]);
        let i = WordFrequencyList::intersection(&a, &b);

        assert_eq!(i.len(), 1);
        assert_eq!(i.count("cat"), 1);
        assert!(WordFrequencyList::intersection(&a, &WordFrequencyList::new()).is_empty());
    }

    #[test]
    fn reorder_by_weight_puts_rare_words_first() {
        let mut lexicon = Lexicon::new();
        let common = vec!["common".to_string()];
        lexicon.add_document(&common);
        lexicon.add_document(&common);
        lexicon.add_document(&["common".to_string(), "rare".to_string()]);
        lexicon.recalculate_weights();

        let mut wfl = list(&["common", "rare"]);
        wfl.reorder_by_weight(&lexicon);
        assert_eq!(wfl.words_by_weight(), ["rare", "common"]);
    }

    #[test]
    fn fresh_list_orders_by_count() {
        let wfl = list(&["pear", "apple", "pear", "fig"]);
        assert_eq!(wfl.words_by_weight(), ["pear", "apple", "fig"]);

        let u = WordFrequencyList::union(&wfl, &list(&["fig", "fig"]));
        assert_eq!(u.words_by_weight(), ["fig", "pear", "apple"]);
    }

    #[test]
    fn words_by_weight_borrows_the_stored_order() {
        let wfl = list(&["cat", "dog"]);
        let first = wfl.words_by_weight();
        let second = wfl.words_by_weight();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.len(), wfl.len());
    }

    #[test]
    fn add_replaces_relevance_order() {
        let mut lexicon = Lexicon::new();
        lexicon.add_document(&["alpha".to_string()]);
        lexicon.recalculate_weights();

        let mut wfl = list(&["alpha"]);
        wfl.reorder_by_weight(&lexicon);
        wfl.add("beta");
        wfl.add("beta");

        // falls back to local count order
        assert_eq!(wfl.words_by_weight(), ["beta", "alpha"]);
    }
}
