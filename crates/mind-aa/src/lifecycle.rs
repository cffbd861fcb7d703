//! Mind lifecycle state and background-work bookkeeping.

use crate::error::AaResult;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Lifecycle state of a mind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MindState {
    /// No corpus-derived structures.
    #[default]
    Sleeping,
    /// Corpus being learned.
    Dreaming,
    /// Ready to answer queries.
    Thinking,
}

impl fmt::Display for MindState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sleeping => write!(f, "sleeping"),
            Self::Dreaming => write!(f, "dreaming"),
            Self::Thinking => write!(f, "thinking"),
        }
    }
}

/// Receives lifecycle transitions, e.g. to persist them.
pub trait MindStateListener: Send + Sync {
    fn persist_mind_state(&self, state: MindState);
}

/// A listener that ignores every transition.
#[derive(Debug, Default)]
pub struct NoOpListener;

impl MindStateListener for NoOpListener {
    fn persist_mind_state(&self, _state: MindState) {}
}

/// Shared lifecycle state plus the active-process counter.
pub struct MindStatus {
    state: RwLock<MindState>,
    active_processes: AtomicUsize,
    listener: Arc<dyn MindStateListener>,
}

impl MindStatus {
    pub fn new() -> Self {
        Self::with_listener(Arc::new(NoOpListener))
    }

    pub fn with_listener(listener: Arc<dyn MindStateListener>) -> Self {
        Self {
            state: RwLock::new(MindState::default()),
            active_processes: AtomicUsize::new(0),
            listener,
        }
    }

    pub fn state(&self) -> MindState {
        self.state.read().map(|s| *s).unwrap_or_default()
    }

    /// Moves to `state` and notifies the listener.
    pub fn set_state(&self, state: MindState) {
        let previous = match self.state.write() {
            Ok(mut current) => std::mem::replace(&mut *current, state),
            Err(_) => return,
        };
        if previous != state {
            info!("Mind {} -> {}", previous, state);
        }
        self.listener.persist_mind_state(state);
    }

    pub fn inc_active_processes(&self) -> usize {
        self.active_processes.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn dec_active_processes(&self) -> usize {
        let previous = self
            .active_processes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or(0);
        previous.saturating_sub(1)
    }

    pub fn active_processes(&self) -> usize {
        self.active_processes.load(Ordering::SeqCst)
    }

    /// Returns true while background work is outstanding.
    pub fn is_busy(&self) -> bool {
        self.active_processes() > 0
    }

    /// Settles a learn: THINKING when it succeeded, SLEEPING otherwise.
    ///
    /// Called by the learning job itself, so the transition happens even
    /// when nobody awaits the learn.
    pub fn finish_learning(&self, result: &AaResult<bool>) {
        match result {
            Ok(true) => self.set_state(MindState::Thinking),
            Ok(false) => self.set_state(MindState::Sleeping),
            Err(e) => {
                warn!("Learning failed: {}", e);
                self.set_state(MindState::Sleeping);
            }
        }
    }

    /// Counts one background process until the returned guard is dropped.
    pub fn begin_process(self: &Arc<Self>) -> ActiveProcess {
        let active = self.inc_active_processes();
        debug!("Background process started, {} active", active);
        ActiveProcess {
            status: self.clone(),
        }
    }
}

impl Default for MindStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MindStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MindStatus")
            .field("state", &self.state())
            .field("active_processes", &self.active_processes())
            .finish()
    }
}

/// Guard decrementing the active-process counter on drop, including when
/// the owning job panics.
#[derive(Debug)]
pub struct ActiveProcess {
    status: Arc<MindStatus>,
}

impl Drop for ActiveProcess {
    fn drop(&mut self) {
        let active = self.status.dec_active_processes();
        debug!("Background process finished, {} active", active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        states: Mutex<Vec<MindState>>,
    }

    impl MindStateListener for RecordingListener {
        fn persist_mind_state(&self, state: MindState) {
            self.states.lock().unwrap().push(state);
        }
    }

    #[test]
    fn starts_sleeping() {
        let status = MindStatus::new();
        assert_eq!(status.state(), MindState::Sleeping);
        assert!(!status.is_busy());
    }

    #[test]
    fn transitions_reach_listener() {
        let listener = Arc::new(RecordingListener::default());
        let status = MindStatus::with_listener(listener.clone());

        status.set_state(MindState::Dreaming);
        status.set_state(MindState::Thinking);

        assert_eq!(status.state(), MindState::Thinking);
        assert_eq!(
            *listener.states.lock().unwrap(),
            vec![MindState::Dreaming, MindState::Thinking]
        );
    }

    #[test]
    fn finished_learning_settles_state() {
        let status = MindStatus::new();
        status.set_state(MindState::Dreaming);
        status.finish_learning(&Ok(true));
        assert_eq!(status.state(), MindState::Thinking);

        status.set_state(MindState::Dreaming);
        status.finish_learning(&Err(crate::error::AaError::PoolClosed));
        assert_eq!(status.state(), MindState::Sleeping);
    }

    #[test]
    fn counter_never_underflows() {
        let status = MindStatus::new();
        assert_eq!(status.inc_active_processes(), 1);
        assert_eq!(status.dec_active_processes(), 0);
        assert_eq!(status.dec_active_processes(), 0);
        assert_eq!(status.active_processes(), 0);
    }

    #[test]
    fn guard_decrements_on_drop() {
        let status = Arc::new(MindStatus::new());
        let guard = status.begin_process();
        assert!(status.is_busy());
        drop(guard);
        assert!(!status.is_busy());
    }

    #[test]
    fn guard_decrements_on_panic() {
        let status = Arc::new(MindStatus::new());
        let guard = status.begin_process();
        let _ = std::thread::spawn(move || {
            let _guard = guard;
            panic!("worker died");
        })
        .join();
        assert_eq!(status.active_processes(), 0);
    }
}
