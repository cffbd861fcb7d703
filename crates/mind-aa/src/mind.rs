//! The mind: lifecycle around an association assessment.
//!
//! ```text
//! SLEEPING --learn--> DREAMING --learned--> THINKING
//!     ^                                        |
//!     +-------------- sleep / amnesia ---------+
//! ```
//!
//! Lifecycle methods take `&mut self`: whoever holds the mind mutably is the
//! single writer. Queries take `&self` and only answer while thinking.

use crate::assessment::{
    Assessment, AssessmentFuture, AssessmentStats, AssociatedNotes, AssociationOutcome,
    AssociationSource, Unavailable,
};
use crate::config::AaConfig;
use crate::error::AaResult;
use crate::lifecycle::{MindState, MindStateListener, MindStatus, NoOpListener};
use crate::pool::{PoolStats, WorkerPool};
use futures::FutureExt;
use futures::future::ready;
use mind_core::{Memory, Note};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Snapshot of a mind for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MindStats {
    pub state: MindState,
    pub algorithm: &'static str,
    pub active_processes: usize,
    pub memory_notes: usize,
    pub assessment: AssessmentStats,
    pub pool: PoolStats,
}

/// Association engine with its lifecycle.
pub struct Mind {
    config: AaConfig,
    memory: Arc<dyn Memory>,
    status: Arc<MindStatus>,
    pool: WorkerPool,
    assessment: Assessment,
}

impl Mind {
    /// Creates a sleeping mind over `memory`.
    pub fn new(memory: Arc<dyn Memory>, config: AaConfig) -> AaResult<Self> {
        Self::with_listener(memory, config, Arc::new(NoOpListener))
    }

    /// Creates a sleeping mind reporting transitions to `listener`.
    pub fn with_listener(
        memory: Arc<dyn Memory>,
        config: AaConfig,
        listener: Arc<dyn MindStateListener>,
    ) -> AaResult<Self> {
        config.validate()?;
        let status = Arc::new(MindStatus::with_listener(listener));
        let pool = WorkerPool::new(config.max_workers);
        let assessment = Assessment::new(config, memory.clone(), status.clone(), pool.clone());

        info!("Mind created with {} assessment", config.algorithm);
        Ok(Self {
            config,
            memory,
            status,
            pool,
            assessment,
        })
    }

    pub fn config(&self) -> &AaConfig {
        &self.config
    }

    pub fn state(&self) -> MindState {
        self.status.state()
    }

    pub fn status(&self) -> &Arc<MindStatus> {
        &self.status
    }

    pub fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    pub fn memory(&self) -> &Arc<dyn Memory> {
        &self.memory
    }

    /// Learns the memory: DREAMING now, THINKING once learning completes.
    ///
    /// The learn settles the state itself, so the returned future may be
    /// dropped. Small corpora are learned before this returns.
    pub fn learn(&mut self) -> AssessmentFuture<bool> {
        self.status.set_state(MindState::Dreaming);
        self.assessment.dream()
    }

    /// Makes sure the mind is thinking.
    ///
    /// Learns when sleeping. Resolves to `false` while a learn is still in
    /// flight.
    pub fn think(&mut self) -> AssessmentFuture<bool> {
        match self.state() {
            MindState::Sleeping => self.learn(),
            MindState::Dreaming => ready(Ok(false)).boxed(),
            MindState::Thinking => ready(Ok(true)).boxed(),
        }
    }

    /// Forgets everything learned, keeping the matrix allocation.
    pub fn sleep(&mut self) {
        self.warn_if_busy("sleep");
        self.assessment.sleep();
        self.status.set_state(MindState::Sleeping);
    }

    /// Forgets everything, including the matrix.
    pub fn amnesia(&mut self) {
        self.warn_if_busy("amnesia");
        self.assessment.amnesia();
        self.status.set_state(MindState::Sleeping);
    }

    /// Notes associated with `note`.
    pub fn associated_notes(&self, note: &Note) -> AssessmentFuture<AssociationOutcome> {
        if self.state() != MindState::Thinking {
            return not_thinking();
        }
        self.assessment.associated_notes(note)
    }

    /// Notes associated with free text.
    pub fn associated_notes_for_words(
        &self,
        words: &str,
        self_note: Option<&Note>,
    ) -> AssessmentFuture<AssociationOutcome> {
        if self.state() != MindState::Thinking {
            return not_thinking();
        }
        self.assessment.associated_notes_for_words(words, self_note)
    }

    /// Answers a presentation request, filling in its associations.
    ///
    /// Outlines are searched by title with weighted full-text scoring,
    /// whichever strategy is configured.
    pub fn associate(
        &self,
        request: AssociatedNotes,
    ) -> AssessmentFuture<(AssociatedNotes, AssociationOutcome)> {
        let pending = match (&request.source, &request.note) {
            (AssociationSource::Note { .. }, Some(note)) => self.associated_notes(note),
            (AssociationSource::Outline { title, .. }, note) => {
                self.associated_notes_for_words(title, note.as_ref())
            }
            (AssociationSource::Words { words }, note) => {
                self.associated_notes_for_words(words, note.as_ref())
            }
            (AssociationSource::Note { .. }, None) => {
                ready(Ok(AssociationOutcome::Unavailable(Unavailable::NotIndexed))).boxed()
            }
        };

        pending
            .map(move |result| {
                result.map(|outcome| (request.with_outcome(&outcome), outcome))
            })
            .boxed()
    }

    pub fn stats(&self) -> MindStats {
        MindStats {
            state: self.state(),
            algorithm: self.assessment.algorithm().as_str(),
            active_processes: self.status.active_processes(),
            memory_notes: self.memory.notes_count(),
            assessment: self.assessment.stats(),
            pool: self.pool.stats(),
        }
    }

    /// Stops accepting background work and waits for running workers.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }

    fn warn_if_busy(&self, transition: &str) {
        let active = self.status.active_processes();
        if active > 0 {
            warn!(
                "{} requested with {} background processes still active",
                transition, active
            );
        }
    }
}

impl std::fmt::Debug for Mind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mind")
            .field("config", &self.config)
            .field("status", &self.status)
            .field("assessment", &self.assessment)
            .finish()
    }
}

fn not_thinking() -> AssessmentFuture<AssociationOutcome> {
    ready(Ok(AssociationOutcome::Unavailable(Unavailable::EmptyCorpus))).boxed()
}
