//! Bounded worker pool for background assessment work.
//!
//! Every request gets its own future, but at most `max_workers` jobs run at
//! once; the rest wait for a permit. Jobs are CPU-bound and run on tokio's
//! blocking threads.
//!
//! ## Lifecycle
//!
//! - `spawn` reaps finished handles, then queues the job
//! - `shutdown` closes the pool: queued jobs resolve as
//!   [`AaError::PoolClosed`], running jobs finish and are awaited
//!
//! Jobs cannot be cancelled once they hold a permit. Dropping the returned
//! future does not stop the job.
//!
//! The pool must be used from inside a tokio runtime.

use crate::assessment::AssessmentFuture;
use crate::error::AaError;
use futures::FutureExt;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Statistics about pool activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Jobs handed to the pool.
    pub spawned: u64,
    /// Jobs that ran to completion.
    pub completed: u64,
    /// Jobs that panicked or never got to run.
    pub failed: u64,
    /// Finished handles reclaimed.
    pub reaped: u64,
}

/// Bounded pool of blocking workers.
///
/// Cloned handles share the same pool.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    max_workers: usize,
    permits: Arc<Semaphore>,
    handles: Arc<Mutex<JoinSet<()>>>,
    stats: Arc<Mutex<PoolStats>>,
}

impl WorkerPool {
    /// Creates a pool running at most `max_workers` jobs concurrently.
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            max_workers,
            permits: Arc::new(Semaphore::new(max_workers)),
            handles: Arc::new(Mutex::new(JoinSet::new())),
            stats: Arc::new(Mutex::new(PoolStats::default())),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Returns the current pool statistics.
    pub fn stats(&self) -> PoolStats {
        self.stats.lock().map(|s| *s).unwrap_or_default()
    }

    /// Number of handles not yet reaped (running, queued or finished).
    pub fn outstanding(&self) -> usize {
        self.handles.lock().map(|h| h.len()).unwrap_or(0)
    }

    /// Runs `job` on the pool and returns a future of its result.
    pub fn spawn<T, F>(&self, job: F) -> AssessmentFuture<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        if self.is_closed() {
            return futures::future::ready(Err(AaError::PoolClosed)).boxed();
        }

        self.reap();

        let (tx, rx) = oneshot::channel();
        let permits = self.permits.clone();
        let stats = self.stats.clone();

        {
            let mut handles = match self.handles.lock() {
                Ok(handles) => handles,
                Err(_) => return futures::future::ready(Err(AaError::LockPoisoned)).boxed(),
            };

            handles.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        debug!("Pool closed before job started");
                        if let Ok(mut s) = stats.lock() {
                            s.failed += 1;
                        }
                        let _ = tx.send(Err(AaError::PoolClosed));
                        return;
                    }
                };

                let result = tokio::task::spawn_blocking(job).await.map_err(AaError::from);
                if let Ok(mut s) = stats.lock() {
                    match result {
                        Ok(_) => s.completed += 1,
                        Err(_) => s.failed += 1,
                    }
                }
                if let Err(e) = &result {
                    warn!("Worker failed: {}", e);
                }
                let _ = tx.send(result);
            });
        }

        if let Ok(mut s) = self.stats.lock() {
            s.spawned += 1;
        }

        async move {
            rx.await
                .unwrap_or_else(|_| Err(AaError::WorkerFailed("worker dropped".to_string())))
        }
        .boxed()
    }

    /// Reclaims handles of finished jobs; returns how many were reaped.
    pub fn reap(&self) -> usize {
        let mut reaped = 0;
        if let Ok(mut handles) = self.handles.lock() {
            while let Some(result) = handles.try_join_next() {
                if let Err(e) = result {
                    warn!("Reaped worker ended abnormally: {}", e);
                }
                reaped += 1;
            }
        }
        if reaped > 0 {
            debug!("Reaped {} finished workers", reaped);
            if let Ok(mut s) = self.stats.lock() {
                s.reaped += reaped as u64;
            }
        }
        reaped
    }

    /// Closes the pool and waits for every outstanding worker.
    pub async fn shutdown(&self) {
        self.permits.close();

        let mut handles = match self.handles.lock() {
            Ok(mut handles) => std::mem::take(&mut *handles),
            Err(_) => return,
        };

        let outstanding = handles.len();
        let mut reaped = 0u64;
        while let Some(result) = handles.join_next().await {
            if let Err(e) = result {
                warn!("Worker ended abnormally during shutdown: {}", e);
            }
            reaped += 1;
        }
        if let Ok(mut s) = self.stats.lock() {
            s.reaped += reaped;
        }
        info!("Worker pool shut down, {} workers drained", outstanding);
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_WORKERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn spawn_returns_result() {
        let pool = WorkerPool::new(2);
        let value = pool.spawn(|| 21 * 2).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(pool.stats().spawned, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_is_bounded() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let futures: Vec<_> = (0..8)
            .map(|_| {
                let running = running.clone();
                let peak = peak.clone();
                pool.spawn(move || {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(20));
                    running.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for result in futures::future::join_all(futures).await {
            result.unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(pool.stats().completed, 8);
    }

    #[tokio::test]
    async fn panicking_job_reports_failure() {
        let pool = WorkerPool::new(1);
        let result = pool.spawn(|| -> u32 { panic!("boom") }).await;
        assert!(matches!(result, Err(AaError::WorkerFailed(_))));
        assert_eq!(pool.stats().failed, 1);
    }

    #[tokio::test]
    async fn reap_reclaims_finished_handles() {
        let pool = WorkerPool::new(2);
        pool.spawn(|| ()).await.unwrap();
        pool.spawn(|| ()).await.unwrap();

        // the task may still be finalizing after its result was sent
        for _ in 0..100 {
            pool.reap();
            if pool.outstanding() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(pool.outstanding(), 0);
    }

    #[tokio::test]
    async fn shutdown_closes_pool() {
        let pool = WorkerPool::new(1);
        pool.spawn(|| ()).await.unwrap();
        pool.shutdown().await;

        assert!(pool.is_closed());
        assert_eq!(pool.outstanding(), 0);
        assert!(matches!(pool.spawn(|| ()).await, Err(AaError::PoolClosed)));
    }
}
