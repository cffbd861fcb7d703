//! Leaderboard cache with in-flight tracking.
//!
//! Finished leaderboards are cached per note; notes whose leaderboard is
//! being computed sit in the work-in-progress set. Both live behind one
//! lock, so a note is never cached and in progress at the same time.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mind_aa::cache::{Claim, LeaderboardCache};
//!
//! let cache = LeaderboardCache::new();
//! match cache.claim(note_id) {
//!     Claim::Cached(leaderboard) => render(leaderboard),
//!     Claim::InProgress => retry_later(),
//!     Claim::Claimed => {
//!         let leaderboard = compute(note_id);
//!         cache.complete(note_id, leaderboard);
//!     }
//! }
//! ```

use crate::assessment::Association;
use mind_core::NoteId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Result of asking the cache for a note.
#[derive(Debug, Clone, PartialEq)]
pub enum Claim {
    /// A copy of the cached leaderboard.
    Cached(Vec<Association>),
    /// Another worker is computing this note.
    InProgress,
    /// The caller now owns the computation and must `complete` or `abandon` it.
    Claimed,
}

#[derive(Debug, Default)]
struct CacheState {
    cached: HashMap<NoteId, Vec<Association>>,
    in_progress: HashSet<NoteId>,
}

/// Thread-safe leaderboard cache.
///
/// Cloned handles share the same state.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardCache {
    state: Arc<Mutex<CacheState>>,
}

impl LeaderboardCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a note and claims it for computation on a miss.
    pub fn claim(&self, id: NoteId) -> Claim {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(e) => {
                warn!("Leaderboard cache lock poisoned: {}", e);
                return Claim::InProgress;
            }
        };

        if let Some(leaderboard) = state.cached.get(&id) {
            debug!("Leaderboard cache hit for {}", id);
            return Claim::Cached(leaderboard.clone());
        }
        if state.in_progress.contains(&id) {
            debug!("Leaderboard for {} already in progress", id);
            return Claim::InProgress;
        }

        state.in_progress.insert(id);
        debug!("Leaderboard cache miss for {}, claimed", id);
        Claim::Claimed
    }

    /// Returns a copy of the cached leaderboard, if any.
    pub fn get(&self, id: &NoteId) -> Option<Vec<Association>> {
        let state = self.state.lock().ok()?;
        state.cached.get(id).cloned()
    }

    /// Stores a leaderboard and releases the claim.
    pub fn complete(&self, id: NoteId, leaderboard: Vec<Association>) {
        if let Ok(mut state) = self.state.lock() {
            state.in_progress.remove(&id);
            state.cached.insert(id, leaderboard);
        }
    }

    /// Releases a claim without caching anything.
    pub fn abandon(&self, id: &NoteId) {
        if let Ok(mut state) = self.state.lock() {
            state.in_progress.remove(id);
        }
    }

    /// Returns true if a computation for the note is in flight.
    pub fn is_in_progress(&self, id: &NoteId) -> bool {
        self.state
            .lock()
            .map(|s| s.in_progress.contains(id))
            .unwrap_or(false)
    }

    /// Drops every cached leaderboard and claim.
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.cached.clear();
            state.in_progress.clear();
        }
    }

    /// Returns the number of cached leaderboards.
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.cached.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns statistics about the cache.
    pub fn stats(&self) -> CacheStats {
        self.state
            .lock()
            .map(|s| CacheStats {
                cached: s.cached.len(),
                in_progress: s.in_progress.len(),
            })
            .unwrap_or_default()
    }
}

/// Statistics about cache state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached leaderboards.
    pub cached: usize,
    /// Number of leaderboards being computed.
    pub in_progress: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mind_core::Note;

    fn leaderboard() -> Vec<Association> {
        vec![Association {
            note: Note::builder().title("Borrowing").build(),
            score: 0.8,
        }]
    }

    #[test]
    fn claim_then_complete() {
        let cache = LeaderboardCache::new();
        let id = NoteId::new();

        assert_eq!(cache.claim(id), Claim::Claimed);
        assert!(cache.is_in_progress(&id));
        assert_eq!(cache.claim(id), Claim::InProgress);

        cache.complete(id, leaderboard());
        assert!(!cache.is_in_progress(&id));
        assert_eq!(cache.claim(id), Claim::Cached(leaderboard()));
        assert_eq!(cache.stats(), CacheStats { cached: 1, in_progress: 0 });
    }

    #[test]
    fn abandon_releases_claim() {
        let cache = LeaderboardCache::new();
        let id = NoteId::new();

        cache.claim(id);
        cache.abandon(&id);
        assert_eq!(cache.claim(id), Claim::Claimed);
        assert!(cache.get(&id).is_none());
    }

    #[test]
    fn cached_and_in_progress_are_exclusive() {
        let cache = LeaderboardCache::new();
        let id = NoteId::new();

        cache.claim(id);
        cache.complete(id, leaderboard());
        // a cached note is never re-claimed
        assert!(matches!(cache.claim(id), Claim::Cached(_)));
        assert_eq!(cache.stats().in_progress, 0);
    }

    #[test]
    fn clones_share_state() {
        let cache = LeaderboardCache::new();
        let other = cache.clone();
        let id = NoteId::new();

        cache.claim(id);
        assert_eq!(other.claim(id), Claim::InProgress);
    }

    #[test]
    fn clear_drops_everything() {
        let cache = LeaderboardCache::new();
        let a = NoteId::new();
        let b = NoteId::new();
        cache.claim(a);
        cache.complete(a, leaderboard());
        cache.claim(b);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
