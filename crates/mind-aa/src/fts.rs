//! Weighted full-text search association assessment.
//!
//! No matrix: each query is scored against a snapshot of the outlines.
//!
//! ## Scoring
//!
//! Case-insensitive substring matching, per occurrence:
//!
//! | where | points |
//! |---|---|
//! | title | 100 |
//! | description | 10 |
//!
//! An outline that matches is itself a result (as its descriptor note) and
//! adds its score, capped, to each of its notes. If the whole query
//! matches nothing, it is split into at most a few significant words and
//! the word scores are summed. Results are normalized so the best one
//! scores 1.0.

use crate::assessment::{
    AssessmentFuture, AssessmentStats, Association, AssociationOutcome, Unavailable,
};
use crate::config::AaConfig;
use crate::error::AaResult;
use crate::lexicon::WordBlacklist;
use crate::lifecycle::MindStatus;
use crate::pool::WorkerPool;
use futures::FutureExt;
use futures::future::ready;
use mind_core::{Memory, Note, NoteId, Outline};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Points per title occurrence.
pub const TITLE_MATCH_SCORE: u32 = 100;

/// Points per description occurrence.
pub const DESCRIPTION_MATCH_SCORE: u32 = 10;

/// Search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtsParams {
    pub max_results: usize,
    pub max_words: usize,
    pub outline_bonus_cap: u32,
}

impl From<&AaConfig> for FtsParams {
    fn from(config: &AaConfig) -> Self {
        Self {
            max_results: config.leaderboard_size,
            max_words: config.fts_max_words,
            outline_bonus_cap: config.fts_outline_bonus_cap,
        }
    }
}

/// Raw hits in first-found order, merged by note.
#[derive(Debug, Default)]
struct Hits {
    order: Vec<(Note, u32)>,
    positions: HashMap<NoteId, usize>,
}

impl Hits {
    fn add(&mut self, note: &Note, score: u32) {
        match self.positions.get(&note.id) {
            Some(&i) => self.order[i].1 += score,
            None => {
                self.positions.insert(note.id, self.order.len());
                self.order.push((note.clone(), score));
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn occurrences(haystack: &str, needle: &str) -> u32 {
    if needle.is_empty() {
        return 0;
    }
    haystack.to_lowercase().matches(needle).count() as u32
}

fn text_score(title: &str, description: &str, needle: &str) -> u32 {
    TITLE_MATCH_SCORE * occurrences(title, needle)
        + DESCRIPTION_MATCH_SCORE * occurrences(description, needle)
}

/// Scores every outline and note against one phrase.
fn score_phrase(outlines: &[Outline], phrase: &str, outline_bonus_cap: u32, hits: &mut Hits) {
    let needle = phrase.trim().to_lowercase();
    if needle.is_empty() {
        return;
    }

    for outline in outlines {
        let outline_score = text_score(&outline.title, &outline.description, &needle);
        if outline_score > 0 {
            hits.add(&outline.descriptor_note(), outline_score);
        }
        // every note of a matching outline gets the bonus, matching or not
        let bonus = outline_score.min(outline_bonus_cap);

        for note in &outline.notes {
            let score = text_score(&note.title, &note.description, &needle) + bonus;
            if score > 0 {
                hits.add(note, score);
            }
        }
    }
}

/// Splits a query into significant words.
///
/// Words are lowercased, stripped of leading and trailing non-alphabetic
/// characters, deduplicated and filtered against the blacklist.
pub fn split_query(query: &str, blacklist: &WordBlacklist, max_words: usize) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for raw in query.split_whitespace() {
        let word = raw
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if word.is_empty() || blacklist.contains(&word) || words.contains(&word) {
            continue;
        }
        words.push(word);
        if words.len() == max_words {
            break;
        }
    }
    words
}

/// Searches `outlines` for `query`.
///
/// `self_id` is dropped when it is the only result.
pub fn search(
    outlines: &[Outline],
    query: &str,
    self_id: Option<NoteId>,
    blacklist: &WordBlacklist,
    params: FtsParams,
) -> Vec<Association> {
    let mut hits = Hits::default();
    score_phrase(outlines, query, params.outline_bonus_cap, &mut hits);

    if hits.is_empty() {
        let words = split_query(query, blacklist, params.max_words);
        debug!("No exact match for '{}', trying words {:?}", query, words);
        for word in &words {
            score_phrase(outlines, word, params.outline_bonus_cap, &mut hits);
        }
    }

    let mut ranked = hits.order;
    // stable: equal scores keep first-found order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(params.max_results);

    if let [(only, _)] = ranked.as_slice() {
        if Some(only.id) == self_id {
            return Vec::new();
        }
    }

    let top = ranked.first().map_or(1, |(_, score)| *score).max(1) as f32;
    ranked
        .into_iter()
        .map(|(note, score)| Association {
            note,
            score: score as f32 / top,
        })
        .collect()
}

/// Runs [`search`] on the pool as one active process.
pub(crate) fn spawn_search(
    pool: &WorkerPool,
    status: &Arc<MindStatus>,
    outlines: Arc<Vec<Outline>>,
    query: &str,
    self_note: Option<&Note>,
    blacklist: Arc<WordBlacklist>,
    params: FtsParams,
) -> AssessmentFuture<AssociationOutcome> {
    let query = query.to_string();
    let self_id = self_note.map(|n| n.id);
    let process = status.begin_process();

    pool.spawn(move || {
        let _process = process;
        let associations = search(&outlines, &query, self_id, &blacklist, params);
        AssociationOutcome::from_leaderboard(associations)
    })
}

/// Full-text search strategy.
pub struct WeightedFtsAssessment {
    config: AaConfig,
    memory: Arc<dyn Memory>,
    status: Arc<MindStatus>,
    pool: WorkerPool,
    blacklist: Arc<WordBlacklist>,
    outlines: Arc<RwLock<Option<Arc<Vec<Outline>>>>>,
}

impl WeightedFtsAssessment {
    pub fn new(
        config: AaConfig,
        memory: Arc<dyn Memory>,
        status: Arc<MindStatus>,
        pool: WorkerPool,
    ) -> Self {
        Self {
            config,
            memory,
            status,
            pool,
            blacklist: Arc::new(WordBlacklist::common_words()),
            outlines: Arc::new(RwLock::new(None)),
        }
    }

    /// Snapshots the outlines; always resolves immediately.
    pub fn dream(&mut self) -> AssessmentFuture<bool> {
        let result = self.snapshot();
        self.status.finish_learning(&result);
        ready(result).boxed()
    }

    fn snapshot(&mut self) -> AaResult<bool> {
        let outlines = self.memory.outlines();
        let notes: usize = outlines.iter().map(|o| o.notes.len()).sum();
        let result: AaResult<bool> = self
            .outlines
            .write()
            .map(|mut slot| {
                *slot = Some(Arc::new(outlines));
                true
            })
            .map_err(Into::into);
        info!("Full-text search snapshot of {} notes", notes);
        result
    }

    /// Notes associated with `note`, searching for its title.
    pub fn associated_notes(&self, note: &Note) -> AssessmentFuture<AssociationOutcome> {
        self.associated_notes_for_words(&note.title, Some(note))
    }

    /// Notes matching `words`.
    pub fn associated_notes_for_words(
        &self,
        words: &str,
        self_note: Option<&Note>,
    ) -> AssessmentFuture<AssociationOutcome> {
        let outlines = match self.outlines.read() {
            Ok(slot) => slot.clone(),
            Err(e) => return ready(Err(e.into())).boxed(),
        };
        let Some(outlines) = outlines.filter(|o| o.iter().any(|outline| !outline.notes.is_empty()))
        else {
            return ready(Ok(AssociationOutcome::Unavailable(Unavailable::EmptyCorpus))).boxed();
        };

        spawn_search(
            &self.pool,
            &self.status,
            outlines,
            words,
            self_note,
            self.blacklist.clone(),
            FtsParams::from(&self.config),
        )
    }

    pub fn sleep(&mut self) {
        if let Ok(mut slot) = self.outlines.write() {
            *slot = None;
        }
    }

    /// Same as sleep; there is no matrix to discard.
    pub fn amnesia(&mut self) {
        self.sleep();
    }

    pub fn stats(&self) -> AssessmentStats {
        let indexed_notes = self
            .outlines
            .read()
            .ok()
            .and_then(|slot| {
                slot.as_ref()
                    .map(|o| o.iter().map(|outline| outline.notes.len()).sum())
            })
            .unwrap_or(0);
        AssessmentStats {
            indexed_notes,
            ..Default::default()
        }
    }
}

impl fmt::Debug for WeightedFtsAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedFtsAssessment")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mind_core::InMemoryMemory;

    fn params() -> FtsParams {
        FtsParams::from(&AaConfig::default())
    }

    fn note(title: &str, description: &str) -> Note {
        Note::builder().title(title).description(description).build()
    }

    fn animals() -> Vec<Outline> {
        vec![
            Outline::new("Animals")
                .with_note(note("The red fox", "A small omnivore."))
                .with_note(note("Wolves", "Larger than a fox, hunts in packs.")),
            Outline::new("Plants").with_note(note("Oak", "A tree.")),
        ]
    }

    #[test]
    fn exact_phrase_scores_title_over_description() {
        let results = search(&animals(), "fox", None, &WordBlacklist::common_words(), params());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].note.title, "The red fox");
        assert_eq!(results[0].score, 1.0);
        assert!((results[1].score - 0.1).abs() < 1e-6);
    }

    #[test]
    fn fallback_splits_words() {
        let blacklist = WordBlacklist::common_words();
        let results = search(&animals(), "the quick fox", None, &blacklist, params());

        assert!(!results.is_empty());
        assert_eq!(results[0].note.title, "The red fox");
        assert!(results[0].score > 0.0);
    }

    #[test]
    fn split_query_filters_and_caps() {
        let blacklist = WordBlacklist::common_words();
        let words = split_query("The (quick), brown fox jumps", &blacklist, 3);
        assert_eq!(words, vec!["quick", "brown", "fox"]);
        assert!(split_query("the of and", &blacklist, 3).is_empty());
        assert_eq!(split_query("fox Fox fox!", &blacklist, 3), vec!["fox"]);
    }

    #[test]
    fn outline_match_is_a_result_and_a_capped_bonus() {
        let outlines = vec![
            Outline::new("Rust notes")
                .with_note(note("Rust ownership", ""))
                .with_note(note("Unrelated", "")),
        ];
        let results = search(&outlines, "rust", None, &WordBlacklist::empty(), params());

        assert_eq!(results.len(), 3);
        // 100 + min(100, 50) beats the outline's own 100
        assert_eq!(results[0].note.title, "Rust ownership");
        assert!((results[1].score - 100.0 / 150.0).abs() < 1e-6);
        assert_eq!(results[1].note.id.0, outlines[0].id.0);
        // the bonus alone lifts a note that does not match
        assert_eq!(results[2].note.title, "Unrelated");
        assert!((results[2].score - 50.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn unmatched_outline_gives_no_bonus() {
        let outlines = vec![
            Outline::new("Garden")
                .with_note(note("Rust on tools", ""))
                .with_note(note("Tomatoes", "")),
        ];
        let results = search(&outlines, "rust", None, &WordBlacklist::empty(), params());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].note.title, "Rust on tools");
    }

    #[test]
    fn self_match_alone_is_dropped() {
        let outlines = animals();
        let oak = outlines[1].notes[0].clone();
        let results = search(&outlines, "Oak", Some(oak.id), &WordBlacklist::empty(), params());
        assert!(results.is_empty());
    }

    #[test]
    fn results_are_capped() {
        let mut outline = Outline::new("Many");
        for i in 0..20 {
            outline.add_note(note(&format!("fox {}", i), ""));
        }
        let results = search(&[outline], "fox", None, &WordBlacklist::empty(), params());
        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|r| r.score == 1.0));
    }

    #[tokio::test]
    async fn assessment_requires_dream() {
        let mut fts = WeightedFtsAssessment::new(
            AaConfig::default(),
            Arc::new(InMemoryMemory::with_outlines(animals())),
            Arc::new(MindStatus::new()),
            WorkerPool::new(1),
        );

        let before = fts.associated_notes_for_words("fox", None).await.unwrap();
        assert_eq!(before, AssociationOutcome::Unavailable(Unavailable::EmptyCorpus));

        assert!(fts.dream().now_or_never().unwrap().unwrap());
        let after = fts.associated_notes_for_words("fox", None).await.unwrap();
        assert!(after.found());
        assert_eq!(fts.pool.stats().spawned, 1);
        assert_eq!(fts.stats().indexed_notes, 3);

        fts.amnesia();
        assert_eq!(fts.stats().indexed_notes, 0);
    }
}
