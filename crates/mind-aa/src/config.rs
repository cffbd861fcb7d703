//! Engine configuration from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;

/// Default number of notes above which learning and queries run on the pool.
pub const DEFAULT_ASYNC_THRESHOLD: usize = 200;

/// Default leaderboard capacity (K).
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Default number of heaviest words per document used for description similarity.
pub const DEFAULT_WORD_RELEVANCY_THRESHOLD: usize = 10;

/// Default bound on concurrently running workers.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Default number of words the full-text fallback splits a query into.
pub const DEFAULT_FTS_MAX_WORDS: usize = 3;

/// Default cap on the outline score added to each of its notes.
pub const DEFAULT_FTS_OUTLINE_BONUS_CAP: u32 = 50;

/// Association assessment algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AaAlgorithm {
    /// Bag-of-words similarity matrix with cached leaderboards.
    #[default]
    Bow,
    /// Weighted full-text search with a word-splitting fallback.
    WeightedFts,
}

impl AaAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bow => "bow",
            Self::WeightedFts => "weighted-fts",
        }
    }
}

impl fmt::Display for AaAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AaAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bow" | "bag-of-words" => Ok(Self::Bow),
            "weighted-fts" | "weighted_fts" | "fts" => Ok(Self::WeightedFts),
            other => Err(ConfigError::InvalidValue {
                name: "MIND_AA_ALGORITHM".to_string(),
                reason: format!("unknown algorithm '{}'", other),
            }),
        }
    }
}

/// Association engine configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AaConfig {
    /// Which strategy answers association queries.
    pub algorithm: AaAlgorithm,
    /// Notes count above which dreaming is off-loaded to a worker.
    pub async_threshold: usize,
    /// Leaderboard capacity (K).
    pub leaderboard_size: usize,
    /// Heaviest words per document considered by description similarity.
    pub word_relevancy_threshold: usize,
    /// Maximum number of concurrently running workers.
    pub max_workers: usize,
    /// Maximum words used by the full-text fallback.
    pub fts_max_words: usize,
    /// Cap on the outline score added to each of its notes.
    pub fts_outline_bonus_cap: u32,
}

impl Default for AaConfig {
    fn default() -> Self {
        Self {
            algorithm: AaAlgorithm::default(),
            async_threshold: DEFAULT_ASYNC_THRESHOLD,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            word_relevancy_threshold: DEFAULT_WORD_RELEVANCY_THRESHOLD,
            max_workers: DEFAULT_MAX_WORKERS,
            fts_max_words: DEFAULT_FTS_MAX_WORDS,
            fts_outline_bonus_cap: DEFAULT_FTS_OUTLINE_BONUS_CAP,
        }
    }
}

impl AaConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `MIND_AA_ALGORITHM`: `bow` or `weighted-fts` (default: bow)
    /// - `MIND_ASYNC_THRESHOLD`: notes count (default: 200)
    /// - `MIND_LEADERBOARD_SIZE`: K (default: 10)
    /// - `MIND_WORD_RELEVANCY_THRESHOLD`: words per document (default: 10)
    /// - `MIND_MAX_WORKERS`: pool bound (default: 4)
    /// - `MIND_FTS_MAX_WORDS`: fallback word cap (default: 3)
    /// - `MIND_FTS_OUTLINE_BONUS_CAP`: outline bonus cap (default: 50)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let algorithm = match lookup("MIND_AA_ALGORITHM") {
            Some(value) => value.parse()?,
            None => defaults.algorithm,
        };

        let config = Self {
            algorithm,
            async_threshold: parse_var(&lookup, "MIND_ASYNC_THRESHOLD", defaults.async_threshold)?,
            leaderboard_size: parse_var(
                &lookup,
                "MIND_LEADERBOARD_SIZE",
                defaults.leaderboard_size,
            )?,
            word_relevancy_threshold: parse_var(
                &lookup,
                "MIND_WORD_RELEVANCY_THRESHOLD",
                defaults.word_relevancy_threshold,
            )?,
            max_workers: parse_var(&lookup, "MIND_MAX_WORKERS", defaults.max_workers)?,
            fts_max_words: parse_var(&lookup, "MIND_FTS_MAX_WORDS", defaults.fts_max_words)?,
            fts_outline_bonus_cap: parse_var(
                &lookup,
                "MIND_FTS_OUTLINE_BONUS_CAP",
                defaults.fts_outline_bonus_cap,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.leaderboard_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MIND_LEADERBOARD_SIZE".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.max_workers == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MIND_MAX_WORKERS".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Sets the algorithm.
    pub fn with_algorithm(mut self, algorithm: AaAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the async threshold.
    pub fn with_async_threshold(mut self, threshold: usize) -> Self {
        self.async_threshold = threshold;
        self
    }

    /// Sets the leaderboard size.
    pub fn with_leaderboard_size(mut self, size: usize) -> Self {
        self.leaderboard_size = size;
        self
    }

    /// Sets the word relevancy threshold.
    pub fn with_word_relevancy_threshold(mut self, threshold: usize) -> Self {
        self.word_relevancy_threshold = threshold;
        self
    }

    /// Sets the worker bound.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
