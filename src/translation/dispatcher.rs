/*!
 * Parallel dispatch of translation tasks.
 *
 * Tasks run on a bounded pool of async workers. Results arrive in
 * completion order and are sorted back by block index before returning, so
 * the outcome is the same for any worker count.
 */

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

use crate::errors::{DispatchError, TranslationError};

use super::worker::{BlockTranslationWorker, TranslationResult, TranslationTask};

/// Progress side channel: `(completed, total)`
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// What happens to running tasks when a run is cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationPolicy {
    /// Stop starting tasks, wait for the running ones
    #[default]
    Drain,
    /// Drop running tasks and return at once
    Abandon,
}

/// Runs tasks through a shared worker with bounded parallelism
pub struct ParallelDispatcher {
    worker: BlockTranslationWorker,
    task_timeout: Duration,
    policy: CancellationPolicy,
    cancel: Option<watch::Receiver<bool>>,
    completed: Arc<AtomicUsize>,
    progress_callback: Option<ProgressCallback>,
}

impl ParallelDispatcher {
    pub fn new(worker: BlockTranslationWorker, task_timeout: Duration) -> Self {
        Self {
            worker,
            task_timeout,
            policy: CancellationPolicy::default(),
            cancel: None,
            completed: Arc::new(AtomicUsize::new(0)),
            progress_callback: None,
        }
    }

    /// Listen for cancellation; the run stops once the value becomes `true`
    pub fn with_cancellation(mut self, signal: watch::Receiver<bool>, policy: CancellationPolicy) -> Self {
        self.cancel = Some(signal);
        self.policy = policy;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Tasks finished in the current or last run
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Translate all tasks, at most `worker_count` at a time
    ///
    /// Every task yields exactly one result, sorted by index. A task that
    /// exceeds the timeout gets a network error and keeps its source text.
    /// A cancelled run returns `DispatchError::Cancelled` and no results.
    pub async fn run(
        &self,
        tasks: Vec<TranslationTask>,
        worker_count: usize,
    ) -> Result<Vec<TranslationResult>, DispatchError> {
        let total = tasks.len();
        let worker_count = worker_count.max(1);
        self.completed.store(0, Ordering::SeqCst);
        debug!("Dispatching {} tasks over {} workers", total, worker_count);

        let mut results_stream = stream::iter(tasks)
            .map(|task| {
                let worker = self.worker.clone();
                let cancel = self.cancel.clone();
                let completed = self.completed.clone();
                let progress_callback = self.progress_callback.clone();
                let task_timeout = self.task_timeout;

                async move {
                    // Not started before cancellation: skip
                    if cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
                        return None;
                    }

                    let result = match tokio::time::timeout(task_timeout, worker.process(&task)).await {
                        Ok(result) => result,
                        Err(_) => {
                            warn!("Block {} timed out after {:?}", task.index, task_timeout);
                            TranslationResult::failure(
                                &task,
                                TranslationError::network(format!("timed out after {:?}", task_timeout)),
                            )
                        }
                    };

                    let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(callback) = &progress_callback {
                        callback(current, total);
                    }
                    Some(result)
                }
            })
            .buffer_unordered(worker_count);

        let mut results = Vec::with_capacity(total);
        let mut cancel = self.cancel.clone();
        let mut cancelled = false;

        loop {
            if cancelled {
                match results_stream.next().await {
                    Some(Some(result)) => results.push(result),
                    Some(None) => {}
                    None => break,
                }
                continue;
            }

            tokio::select! {
                biased;
                _ = wait_for_cancel(&mut cancel) => {
                    cancelled = true;
                    warn!("Cancellation requested ({:?}), {} of {} blocks done", self.policy, results.len(), total);
                    if self.policy == CancellationPolicy::Abandon {
                        break;
                    }
                }
                next = results_stream.next() => match next {
                    Some(Some(result)) => results.push(result),
                    Some(None) => {}
                    None => break,
                },
            }
        }

        if cancelled {
            return Err(DispatchError::Cancelled {
                completed: self.completed(),
                total,
            });
        }

        results.sort_by_key(|result| result.index);
        Ok(results)
    }
}

/// Resolves once the signal reads `true`; never resolves without a signal
async fn wait_for_cancel(signal: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = signal {
        if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}
