//! Blocking-call dispatcher: a bounded worker pool for CPU-bound jobs.
//!
//! ## Why not bare `spawn_blocking`?
//!
//! Model construction and inference can each pin a core for seconds. Tokio's
//! blocking pool grows to hundreds of threads under load, so dispatching
//! every heavy call straight to `spawn_blocking` would let a burst of
//! concurrent conversions oversubscribe the machine. A fair semaphore in
//! front of the pool caps in-flight jobs at a configured width; excess
//! submissions queue in FIFO order (tokio's `Semaphore` hands out permits in
//! arrival order).
//!
//! Everything heavy routes through one [`Dispatcher`] instance: model
//! loading, recognition, synthesis, and staging-file writes. That gives a
//! single place to later apply queue-depth limits or per-job timeouts.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::ConvertError;

/// Bounded executor for blocking jobs. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct Dispatcher {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl Dispatcher {
    /// Create a dispatcher allowing at most `workers` concurrent jobs.
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// Number of jobs that may run concurrently.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run a blocking job off the async scheduler and await its result.
    ///
    /// The permit is held for the duration of the job, not just submission,
    /// so the bound covers execution. A panicking job surfaces as
    /// [`ConvertError::Internal`] rather than poisoning the caller.
    pub async fn dispatch<T, F>(&self, job: F) -> Result<T, ConvertError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| ConvertError::Internal("dispatcher is closed".to_string()))?;
        debug!(available = self.permits.available_permits(), "job admitted");

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| ConvertError::Internal(format!("worker job panicked: {e}")))
    }
}
