//! Bag-of-words association assessment.
//!
//! Learning tokenizes every note into a weighted document vector. Queries
//! compute one cross of the symmetric association matrix (the note's row
//! and column) and extract the top-K leaderboard, which is then cached.
//!
//! ## Concurrency
//!
//! - The learned [`Corpus`] is immutable and shared by `Arc`; workers keep
//!   the snapshot they started with
//! - Matrix writes happen under one mutex; pair scores are computed outside
//!   it
//! - Each learn bumps a generation number; a worker whose corpus is from an
//!   older generation writes nothing and reports the query as in progress
//! - The cache claim guarantees one worker per note

use crate::assessment::{
    AssessmentFuture, AssessmentStats, Association, AssociationOutcome, Unavailable,
};
use crate::bag_of_words::BagOfWords;
use crate::cache::{Claim, LeaderboardCache};
use crate::config::AaConfig;
use crate::error::AaResult;
use crate::features::AssociationFeatures;
use crate::fts::{self, FtsParams};
use crate::leaderboard::Leaderboard;
use crate::lexicon::{Lexicon, WordBlacklist, tokenize};
use crate::lifecycle::MindStatus;
use crate::matrix::{AaMatrix, SELF_SIMILARITY};
use crate::pool::WorkerPool;
use crate::word_frequency::WordFrequencyList;
use futures::FutureExt;
use futures::future::ready;
use mind_core::{Memory, Note, NoteId, Outline};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything learned from one snapshot of the memory.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    generation: u64,
    notes: Vec<Note>,
    index: HashMap<NoteId, usize>,
    bag_of_words: BagOfWords,
    lexicon: Lexicon,
    outlines: Arc<Vec<Outline>>,
}

impl Corpus {
    /// Learns every note of `outlines` and keeps the outlines for
    /// full-text queries.
    pub fn from_outlines(outlines: Vec<Outline>, blacklist: &WordBlacklist) -> Self {
        let notes = outlines
            .iter()
            .flat_map(|outline| outline.notes.iter().cloned())
            .collect();
        Self {
            outlines: Arc::new(outlines),
            ..Self::learn(notes, blacklist)
        }
    }

    /// Tokenizes and indexes `notes`; matrix indices follow their order.
    pub fn learn(notes: Vec<Note>, blacklist: &WordBlacklist) -> Self {
        let mut lexicon = Lexicon::new();
        let mut bag_of_words = BagOfWords::new();
        let mut index = HashMap::with_capacity(notes.len());

        for (i, note) in notes.iter().enumerate() {
            let tokens = tokenize(&note.text(), Some(blacklist));
            lexicon.add_document(&tokens);
            bag_of_words.insert(note.id, WordFrequencyList::from_tokens(&tokens));
            index.insert(note.id, i);
        }

        lexicon.recalculate_weights();
        bag_of_words.reorder_doc_vectors_by_weight(&lexicon);

        Self {
            generation: 0,
            notes,
            index,
            bag_of_words,
            lexicon,
            outlines: Arc::default(),
        }
    }

    /// Row/column of a note in the matrix; `None` if not indexed.
    pub fn matrix_index(&self, id: &NoteId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn note(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Outlines the corpus was learned from; empty for [`Corpus::learn`].
    pub fn outlines(&self) -> &Arc<Vec<Outline>> {
        &self.outlines
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn bag_of_words(&self) -> &BagOfWords {
        &self.bag_of_words
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Association score of two indexed notes.
    pub fn score(&self, x: usize, y: usize, word_relevancy_threshold: usize) -> f32 {
        if x == y {
            return SELF_SIMILARITY;
        }
        let (Some(a), Some(b)) = (self.notes.get(x), self.notes.get(y)) else {
            return 0.0;
        };

        let empty = WordFrequencyList::new();
        let a_words = self.bag_of_words.get(&a.id).unwrap_or(&empty);
        let b_words = self.bag_of_words.get(&b.id).unwrap_or(&empty);

        AssociationFeatures::assess(a, a_words, b, b_words, &self.lexicon, word_relevancy_threshold)
            .metric()
    }
}

#[derive(Debug, Default)]
struct SharedMatrix {
    generation: u64,
    matrix: AaMatrix,
}

/// Releases a cache claim unless the leaderboard was stored.
///
/// Runs on drop, so a panicking worker does not leave the note claimed.
struct PendingLeaderboard {
    cache: LeaderboardCache,
    id: NoteId,
    armed: bool,
}

impl PendingLeaderboard {
    fn new(cache: LeaderboardCache, id: NoteId) -> Self {
        Self {
            cache,
            id,
            armed: true,
        }
    }

    fn complete(mut self, leaderboard: Vec<Association>) {
        self.armed = false;
        self.cache.complete(self.id, leaderboard);
    }

    /// The claim was dropped by a relearn; nothing to release.
    fn forget(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingLeaderboard {
    fn drop(&mut self) {
        if self.armed {
            self.cache.abandon(&self.id);
        }
    }
}

/// State shared between the assessment and its workers.
#[derive(Clone)]
struct Engine {
    corpus: Arc<RwLock<Option<Arc<Corpus>>>>,
    matrix: Arc<Mutex<SharedMatrix>>,
    cache: LeaderboardCache,
    leaderboard_size: usize,
    word_relevancy_threshold: usize,
}

impl Engine {
    fn snapshot(&self) -> AaResult<Option<Arc<Corpus>>> {
        Ok(self.corpus.read()?.clone())
    }

    /// Makes `corpus` current: new generation, empty matrix, empty cache.
    fn install(&self, mut corpus: Corpus) -> AaResult<()> {
        let mut shared = self.matrix.lock()?;
        shared.generation += 1;
        shared.matrix.reset(corpus.len());
        corpus.generation = shared.generation;
        self.cache.clear();
        *self.corpus.write()? = Some(Arc::new(corpus));
        Ok(())
    }

    /// Drops the corpus; `release` also frees the matrix buffer.
    fn uninstall(&self, release: bool) -> AaResult<()> {
        let mut shared = self.matrix.lock()?;
        shared.generation += 1;
        if release {
            shared.matrix.release();
        } else {
            shared.matrix.reset(0);
        }
        self.cache.clear();
        *self.corpus.write()? = None;
        Ok(())
    }

    /// Fills row `y` and returns the locked matrix, or `None` if `corpus`
    /// is no longer current.
    fn fill_row(
        &self,
        corpus: &Corpus,
        y: usize,
    ) -> AaResult<Option<MutexGuard<'_, SharedMatrix>>> {
        let pending: Vec<usize> = {
            let shared = self.matrix.lock()?;
            if shared.generation != corpus.generation {
                return Ok(None);
            }
            if shared.matrix.is_row_done(y) {
                return Ok(Some(shared));
            }
            let unset: Vec<usize> = (0..corpus.len())
                .filter(|&x| x != y && shared.matrix.get(x, y).is_none())
                .collect();
            unset
        };

        let started = Instant::now();
        let scores: Vec<(usize, f32)> = pending
            .into_iter()
            .map(|x| (x, corpus.score(x, y, self.word_relevancy_threshold)))
            .collect();

        let mut shared = self.matrix.lock()?;
        if shared.generation != corpus.generation {
            return Ok(None);
        }
        for &(x, score) in &scores {
            shared.matrix.set_pair(x, y, score);
        }
        shared.matrix.mark_row_done(y);
        debug!(
            "Computed association row {} ({} pairs) in {:?}",
            y,
            scores.len(),
            started.elapsed()
        );
        Ok(Some(shared))
    }

    /// Computes (or reuses) row `y`, extracts its leaderboard and caches it.
    fn leaderboard(
        &self,
        corpus: &Corpus,
        y: usize,
        pending: PendingLeaderboard,
    ) -> AaResult<AssociationOutcome> {
        let Some(shared) = self.fill_row(corpus, y)? else {
            debug!("Corpus relearned while computing row {}", y);
            pending.forget();
            return Ok(AssociationOutcome::InProgress);
        };

        let board = Leaderboard::extract(&shared.matrix.row(y), y, self.leaderboard_size);
        let associations: Vec<Association> = board
            .into_entries()
            .into_iter()
            .filter_map(|(x, score)| {
                corpus.note(x).map(|note| Association {
                    note: note.clone(),
                    score,
                })
            })
            .collect();

        // cached while the matrix is locked so a relearn cannot interleave
        pending.complete(associations.clone());
        drop(shared);

        Ok(AssociationOutcome::from_leaderboard(associations))
    }
}

/// Tokenizes `outlines` and installs the result.
fn learn(
    engine: &Engine,
    outlines: Vec<Outline>,
    blacklist: &WordBlacklist,
    count: usize,
) -> AaResult<bool> {
    let started = Instant::now();
    let corpus = Corpus::from_outlines(outlines, blacklist);
    let words = corpus.lexicon().len();
    engine.install(corpus)?;
    info!(
        "Learned {} notes ({} words) in {:?}",
        count,
        words,
        started.elapsed()
    );
    Ok(true)
}

/// Bag-of-words strategy.
pub struct BowAssessment {
    config: AaConfig,
    memory: Arc<dyn Memory>,
    status: Arc<MindStatus>,
    pool: WorkerPool,
    blacklist: Arc<WordBlacklist>,
    engine: Engine,
}

impl BowAssessment {
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
            engine: Engine {
                corpus: Arc::new(RwLock::new(None)),
                matrix: Arc::new(Mutex::new(SharedMatrix::default())),
                cache: LeaderboardCache::new(),
                leaderboard_size: config.leaderboard_size,
                word_relevancy_threshold: config.word_relevancy_threshold,
            },
        }
    }

    /// Learns the current memory.
    ///
    /// Corpora at or below the async threshold are learned inline and the
    /// returned future is already resolved; larger ones are learned on the
    /// pool. Either way the mind status is settled by the learn itself.
    pub fn dream(&mut self) -> AssessmentFuture<bool> {
        let outlines = self.memory.outlines();
        let count: usize = outlines.iter().map(|o| o.notes.len()).sum();

        if count <= self.config.async_threshold {
            let result = learn(&self.engine, outlines, &self.blacklist, count);
            self.status.finish_learning(&result);
            return ready(result).boxed();
        }

        info!("Learning {} notes in the background", count);
        let process = self.status.begin_process();
        let status = self.status.clone();
        let engine = self.engine.clone();
        let blacklist = self.blacklist.clone();

        let learned = self.pool.spawn(move || -> AaResult<bool> {
            let result = learn(&engine, outlines, &blacklist, count);
            drop(process);
            status.finish_learning(&result);
            result
        });

        learned.map(|result| result.and_then(|inner| inner)).boxed()
    }

    /// Leaderboard of notes associated with `note`.
    ///
    /// Resolves immediately on a cache hit, when the note is already being
    /// computed (`InProgress`), or when no leaderboard can exist. A cache
    /// miss always computes the row on the pool.
    pub fn associated_notes(&self, note: &Note) -> AssessmentFuture<AssociationOutcome> {
        let corpus = match self.engine.snapshot() {
            Ok(Some(corpus)) if !corpus.is_empty() => corpus,
            Ok(_) => {
                return ready(Ok(AssociationOutcome::Unavailable(Unavailable::EmptyCorpus))).boxed();
            }
            Err(e) => return ready(Err(e)).boxed(),
        };
        let Some(y) = corpus.matrix_index(&note.id) else {
            debug!("Note {} is not indexed", note.id);
            return ready(Ok(AssociationOutcome::Unavailable(Unavailable::NotIndexed))).boxed();
        };

        match self.engine.cache.claim(note.id) {
            Claim::Cached(associations) => {
                ready(Ok(AssociationOutcome::from_leaderboard(associations))).boxed()
            }
            Claim::InProgress => ready(Ok(AssociationOutcome::InProgress)).boxed(),
            Claim::Claimed => {
                let pending = PendingLeaderboard::new(self.engine.cache.clone(), note.id);
                let process = self.status.begin_process();
                let engine = self.engine.clone();
                self.pool
                    .spawn(move || {
                        let _process = process;
                        engine.leaderboard(&corpus, y, pending)
                    })
                    .map(|result| result.and_then(|inner| inner))
                    .boxed()
            }
        }
    }

    /// Notes matching free text, scored by weighted full-text search over
    /// the learned outlines.
    ///
    /// Outline requests arrive here as their title.
    pub fn associated_notes_for_words(
        &self,
        words: &str,
        self_note: Option<&Note>,
    ) -> AssessmentFuture<AssociationOutcome> {
        let corpus = match self.engine.snapshot() {
            Ok(Some(corpus)) if !corpus.is_empty() => corpus,
            Ok(_) => {
                return ready(Ok(AssociationOutcome::Unavailable(Unavailable::EmptyCorpus))).boxed();
            }
            Err(e) => return ready(Err(e)).boxed(),
        };

        fts::spawn_search(
            &self.pool,
            &self.status,
            corpus.outlines().clone(),
            words,
            self_note,
            self.blacklist.clone(),
            FtsParams::from(&self.config),
        )
    }

    /// Computes the row of matrix index `y`.
    ///
    /// Returns false when nothing is learned or `y` is out of range.
    pub fn calculate_aa_row(&self, y: usize) -> AaResult<bool> {
        let Some(corpus) = self.engine.snapshot()? else {
            return Ok(false);
        };
        if y >= corpus.len() {
            return Ok(false);
        }
        Ok(self.engine.fill_row(&corpus, y)?.is_some())
    }

    /// Fills the whole matrix, computing each pair once.
    pub fn precalculate_aa(&self) -> AaResult<bool> {
        let Some(corpus) = self.engine.snapshot()? else {
            return Ok(false);
        };

        let started = Instant::now();
        let n = corpus.len();
        let threshold = self.engine.word_relevancy_threshold;
        let scores: Vec<(usize, usize, f32)> = (0..n)
            .flat_map(|y| (y + 1..n).map(move |x| (x, y)))
            .map(|(x, y)| (x, y, corpus.score(x, y, threshold)))
            .collect();

        let mut shared = self.engine.matrix.lock()?;
        if shared.generation != corpus.generation {
            return Ok(false);
        }
        for (x, y, score) in scores {
            shared.matrix.set_pair(x, y, score);
        }
        for y in 0..n {
            shared.matrix.mark_row_done(y);
        }
        info!("Precalculated {}x{} association matrix in {:?}", n, n, started.elapsed());
        Ok(true)
    }

    /// Drops the learned corpus and cached leaderboards; keeps the matrix
    /// allocation.
    pub fn sleep(&mut self) {
        if let Err(e) = self.engine.uninstall(false) {
            warn!("Failed to clear bag-of-words state: {}", e);
        }
    }

    /// Sleeps and frees the matrix.
    pub fn amnesia(&mut self) {
        if let Err(e) = self.engine.uninstall(true) {
            warn!("Failed to clear bag-of-words state: {}", e);
        }
    }

    /// Copy of the current matrix.
    pub fn matrix_snapshot(&self) -> AaResult<AaMatrix> {
        Ok(self.engine.matrix.lock()?.matrix.clone())
    }

    /// The learned corpus, if any.
    pub fn corpus(&self) -> Option<Arc<Corpus>> {
        self.engine.snapshot().ok().flatten()
    }

    pub fn cache(&self) -> &LeaderboardCache {
        &self.engine.cache
    }

    pub fn stats(&self) -> AssessmentStats {
        let corpus = self.corpus();
        let rows_done = self
            .engine
            .matrix
            .lock()
            .map(|shared| shared.matrix.rows_done())
            .unwrap_or(0);

        AssessmentStats {
            indexed_notes: corpus.as_ref().map_or(0, |c| c.len()),
            lexicon_words: corpus.as_ref().map_or(0, |c| c.lexicon().len()),
            rows_done,
            ..Default::default()
        }
        .with_cache(self.engine.cache.stats())
    }
}

impl fmt::Debug for BowAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BowAssessment")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
