//! Corpus-wide lexicon and tokenization.
//!
//! This module provides:
//! - Tokenization with Unicode word boundaries
//! - A common-words blacklist
//! - A lexicon of every word seen during learning, with frequency-derived weights
//!
//! Weights are a function of corpus-wide frequency: they are only meaningful
//! after every document has been added and [`Lexicon::recalculate_weights`]
//! has run.

use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

/// Most common English words, manually filtered from the top of a frequency
/// list. They carry little meaning and would dominate any word overlap.
const COMMON_WORDS: &[&str] = &[
    "the", "of", "and", "to", "a", "in", "for", "is", "on", "that", "by", "this", "with", "i",
    "you", "it", "not", "or", "be", "are", "from", "at", "as", "your", "all", "have", "new",
    "more", "an", "was", "we", "will", "can", "us", "about", "if", "my", "has", "but", "our",
    "one", "other", "do", "no", "they", "he", "may", "what", "which", "their", "any", "there",
    "so", "his", "when", "who", "also", "get", "am", "been", "would", "how", "were", "me",
    "some", "these", "its", "like", "than", "had", "should", "her", "such", "then", "where",
    "does", "could", "did", "those", "want",
];

/// Minimum token length in characters (shorter tokens are filtered).
const MIN_TOKEN_LENGTH: usize = 2;

/// Set of words ignored by tokenization and by the full-text word fallback.
#[derive(Debug, Clone)]
pub struct WordBlacklist {
    words: HashSet<String>,
}

impl WordBlacklist {
    /// Creates an empty blacklist.
    pub fn empty() -> Self {
        Self {
            words: HashSet::new(),
        }
    }

    /// Creates the blacklist of common English words.
    pub fn common_words() -> Self {
        let mut blacklist = Self::empty();
        for word in COMMON_WORDS {
            blacklist.add_word(word);
        }
        blacklist
    }

    /// Adds a word (case-insensitive).
    pub fn add_word(&mut self, word: &str) {
        self.words.insert(word.to_lowercase());
    }

    /// Returns true if the word is blacklisted (case-insensitive).
    pub fn contains(&self, word: &str) -> bool {
        if word.chars().any(char::is_uppercase) {
            self.words.contains(&word.to_lowercase())
        } else {
            self.words.contains(word)
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for WordBlacklist {
    fn default() -> Self {
        Self::common_words()
    }
}

/// Tokenizes text into a list of normalized tokens.
///
/// Processing steps:
/// 1. Split on Unicode word boundaries
/// 2. Convert to lowercase, keep alphanumerics and hyphens
/// 3. Filter by minimum length
/// 4. Remove blacklisted words, if a blacklist is given
pub fn tokenize(text: &str, blacklist: Option<&WordBlacklist>) -> Vec<String> {
    text.unicode_words()
        .map(normalize_token)
        .filter(|token| token.chars().count() >= MIN_TOKEN_LENGTH)
        .filter(|token| blacklist.is_none_or(|b| !b.contains(token)))
        .collect()
}

/// Normalizes a single token by lowercasing and removing non-alphanumeric characters.
fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect::<String>()
        .trim_matches('-')
        .to_lowercase()
}

/// Lexicon statistics for a single word.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LexiconEntry {
    /// Occurrences across the whole corpus.
    pub frequency: u64,
    /// Number of documents containing the word.
    pub document_frequency: usize,
    /// Relevance weight; rarer words weigh more. Zero until recalculated.
    pub weight: f32,
}

/// Corpus-wide word dictionary.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<String, LexiconEntry>,
    document_count: usize,
}

impl Lexicon {
    /// Creates an empty lexicon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a document's tokens.
    ///
    /// Updates total frequency for every occurrence and document frequency
    /// once per unique word.
    pub fn add_document(&mut self, tokens: &[String]) {
        self.document_count += 1;

        let mut seen: HashSet<&str> = HashSet::new();
        for token in tokens {
            let entry = self.entries.entry(token.clone()).or_default();
            entry.frequency += 1;
            if seen.insert(token.as_str()) {
                entry.document_frequency += 1;
            }
        }
    }

    /// Recomputes every word's weight from corpus-wide frequencies.
    ///
    /// weight = ln(1 + documents / document_frequency), so every known word
    /// has a strictly positive weight and words found everywhere weigh least.
    pub fn recalculate_weights(&mut self) {
        let documents = self.document_count.max(1) as f32;
        for entry in self.entries.values_mut() {
            let df = entry.document_frequency.max(1) as f32;
            entry.weight = (1.0 + documents / df).ln();
        }
    }

    /// Returns the weight of a word, or 0 for unknown words.
    pub fn weight(&self, word: &str) -> f32 {
        self.entries.get(word).map(|e| e.weight).unwrap_or(0.0)
    }

    /// Returns the statistics of a word.
    pub fn get(&self, word: &str) -> Option<&LexiconEntry> {
        self.entries.get(word)
    }

    /// Number of documents recorded.
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.document_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn tokenize_basic() {
        let blacklist = WordBlacklist::common_words();
        let tokens = tokenize("Hello, world! This is a test.", Some(&blacklist));
        assert_eq!(tokens, vec!["hello", "world", "test"]);
    }

    #[test]
    fn tokenize_without_blacklist_keeps_common_words() {
        let tokens = tokenize("The quick fox", None);
        assert_eq!(tokens, vec!["the", "quick", "fox"]);
    }

    #[test]
    fn tokenize_empty() {
        assert!(tokenize("", None).is_empty());
    }

    #[test]
    fn tokenize_only_punctuation() {
        assert!(tokenize("... ??? !!! --", None).is_empty());
    }

    #[test]
    fn tokenize_short_words_filtered() {
        let tokens = tokenize("x y zz", None);
        assert_eq!(tokens, vec!["zz"]);
    }

    #[test]
    fn tokenize_markdown() {
        let tokens = tokenize("## Ownership\n* **borrow** `checker`", None);
        assert_eq!(tokens, vec!["ownership", "borrow", "checker"]);
    }

    #[test]
    fn blacklist_is_case_insensitive() {
        let blacklist = WordBlacklist::common_words();
        assert!(blacklist.contains("The"));
        assert!(blacklist.contains("i"));
        assert!(!blacklist.contains("fox"));
        assert!(!blacklist.is_empty());
    }

    #[test]
    fn lexicon_add_document() {
        let mut lexicon = Lexicon::new();
        lexicon.add_document(&tokens(&["cat", "dog", "cat"]));
        lexicon.add_document(&tokens(&["cat", "bird"]));

        assert_eq!(lexicon.document_count(), 2);
        assert_eq!(lexicon.len(), 3);
        let cat = lexicon.get("cat").unwrap();
        assert_eq!(cat.frequency, 3);
        assert_eq!(cat.document_frequency, 2);
        assert_eq!(lexicon.get("dog").unwrap().document_frequency, 1);
    }

    #[test]
    fn weights_zero_before_recalculation() {
        let mut lexicon = Lexicon::new();
        lexicon.add_document(&tokens(&["cat"]));
        assert_eq!(lexicon.weight("cat"), 0.0);
    }

    #[test]
    fn rare_words_weigh_more() {
        let mut lexicon = Lexicon::new();
        lexicon.add_document(&tokens(&["cat", "dog"]));
        lexicon.add_document(&tokens(&["cat", "bird"]));
        lexicon.add_document(&tokens(&["cat", "fish"]));
        lexicon.recalculate_weights();

        assert!(lexicon.weight("dog") > lexicon.weight("cat"));
        assert!(lexicon.weight("cat") > 0.0);
        // ln(1 + 3/1)
        assert!((lexicon.weight("fish") - 4.0f32.ln()).abs() < 1e-6);
        assert_eq!(lexicon.weight("unknown"), 0.0);
    }

    #[test]
    fn lexicon_clear() {
        let mut lexicon = Lexicon::new();
        lexicon.add_document(&tokens(&["cat"]));
        lexicon.clear();
        assert!(lexicon.is_empty());
        assert_eq!(lexicon.document_count(), 0);
    }
}
