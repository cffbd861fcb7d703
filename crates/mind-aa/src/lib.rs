//! mind-aa: Association assessment for the mind engine
//!
//! This crate provides:
//! - Tokenization, a corpus lexicon and weighted per-note word vectors
//! - A lazily filled symmetric association matrix with top-K leaderboards
//! - A leaderboard cache that keeps one computation per note in flight
//! - A bounded worker pool for learning and queries on large corpora
//! - A weighted full-text search strategy behind the same contract
//! - The `Mind` lifecycle (sleeping, dreaming, thinking) around it all
//!
//! # Usage
//!
//! ```rust,ignore
//! use mind_aa::{AaConfig, Mind};
//! use mind_core::InMemoryMemory;
//!
//! let memory = Arc::new(InMemoryMemory::with_outlines(outlines));
//! let mut mind = Mind::new(memory, AaConfig::from_env()?)?;
//! mind.learn().await?;
//!
//! match mind.associated_notes(&note).await? {
//!     AssociationOutcome::Found(leaderboard) => show(leaderboard),
//!     AssociationOutcome::InProgress => ask_again_later(),
//!     AssociationOutcome::Unavailable(why) => show_nothing(why),
//! }
//! ```

pub mod assessment;
pub mod bag_of_words;
pub mod bow;
pub mod cache;
pub mod config;
pub mod error;
pub mod features;
pub mod fts;
pub mod leaderboard;
pub mod lexicon;
pub mod lifecycle;
pub mod matrix;
pub mod mind;
pub mod pool;
pub mod similarity;
pub mod word_frequency;

pub use assessment::{
    Assessment, AssessmentFuture, AssessmentStats, AssociatedNotes, Association,
    AssociationOutcome, AssociationSource, Unavailable,
};
pub use bow::{BowAssessment, Corpus};
pub use cache::{CacheStats, Claim, LeaderboardCache};
pub use config::{AaAlgorithm, AaConfig, ConfigError};
pub use error::{AaError, AaResult};
pub use fts::WeightedFtsAssessment;
pub use leaderboard::Leaderboard;
pub use lexicon::{Lexicon, WordBlacklist, tokenize};
pub use lifecycle::{MindState, MindStateListener, MindStatus, NoOpListener};
pub use matrix::AaMatrix;
pub use mind::{Mind, MindStats};
pub use pool::{PoolStats, WorkerPool};
pub use word_frequency::WordFrequencyList;
