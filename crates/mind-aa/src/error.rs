//! Error types for the association engine.
//!
//! Absence of associations is never an error: it is an
//! [`AssociationOutcome`](crate::assessment::AssociationOutcome). These
//! errors cover infrastructure failures only.

use crate::config::ConfigError;
use thiserror::Error;

/// Result type alias for engine operations.
pub type AaResult<T> = Result<T, AaError>;

/// Errors that can occur inside the association engine.
#[derive(Debug, Clone, Error)]
pub enum AaError {
    /// A shared lock was poisoned by a panicking worker.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// The worker pool has been shut down.
    #[error("worker pool closed")]
    PoolClosed,

    /// A worker panicked or was aborted.
    #[error("worker failed: {0}")]
    WorkerFailed(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl<T> From<std::sync::PoisonError<T>> for AaError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        AaError::LockPoisoned
    }
}

impl From<tokio::task::JoinError> for AaError {
    fn from(err: tokio::task::JoinError) -> Self {
        AaError::WorkerFailed(err.to_string())
    }
}
