use super::caching_executor::{BlockingExecutor, ExecutionOutcome, Executor};
use crate::config::ExecutorConfigSection;
use crate::errors::ExecutorError;
use crate::transaction::Transaction;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Runs transactions on a dedicated pool of `max_workers` threads.
///
/// Outcomes are returned in input order. Identical transactions submitted from different
/// workers are coalesced by the wrapped [`CachingExecutor`](super::CachingExecutor).
pub struct ParallelExecutor<E: ?Sized> {
    inner: Arc<E>,
    pool: ThreadPool,
    max_workers: usize,
}

impl<E: BlockingExecutor + ?Sized> ParallelExecutor<E> {
    pub fn new(inner: Arc<E>, max_workers: usize) -> Result<Self, ExecutorError> {
        let max_workers = max_workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(max_workers)
            .thread_name(|idx| format!("tx-executor-{}", idx))
            .build()
            .map_err(|e| ExecutorError::WorkerPool(e.to_string()))?;
        Ok(Self { inner, pool, max_workers })
    }

    pub fn from_config(inner: Arc<E>, config: &ExecutorConfigSection) -> Result<Self, ExecutorError> {
        Self::new(inner, config.max_workers)
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn execute(&self, transactions: &[Transaction]) -> Vec<ExecutionOutcome> {
        debug!(count = transactions.len(), max_workers = self.max_workers, "Executing transactions in parallel");
        let inner = &self.inner;
        let outcomes: Vec<ExecutionOutcome> = self.pool.install(|| {
            transactions
                .par_iter()
                .enumerate()
                .map(|(idx, tx)| {
                    let outcome = inner.execute_blocking(tx);
                    if let Err(e) = &outcome {
                        warn!(index = idx, "Parallel execution failed: {}", e);
                    }
                    outcome
                })
                .collect()
        });
        log_summary(&outcomes);
        outcomes
    }
}

/// Runs transactions as tokio tasks with at most `max_workers` in flight.
pub struct AsyncParallelExecutor<E: ?Sized> {
    inner: Arc<E>,
    max_workers: usize,
}

impl<E: Executor + ?Sized + 'static> AsyncParallelExecutor<E> {
    pub fn new(inner: Arc<E>, max_workers: usize) -> Self {
        Self { inner, max_workers: max_workers.max(1) }
    }

    pub fn from_config(inner: Arc<E>, config: &ExecutorConfigSection) -> Self {
        Self::new(inner, config.max_workers)
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub async fn execute(&self, transactions: &[Transaction]) -> Vec<ExecutionOutcome> {
        debug!(count = transactions.len(), max_workers = self.max_workers, "Executing transactions in parallel");
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for (idx, tx) in transactions.iter().enumerate() {
            let inner = Arc::clone(&self.inner);
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return (idx, Err(ExecutorError::WorkerPool(e.to_string()))),
                };
                (idx, inner.execute(&tx).await)
            });
        }

        let mut outcomes: Vec<Option<ExecutionOutcome>> = (0..transactions.len()).map(|_| None).collect();
        let mut join_failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, outcome)) => {
                    if let Err(e) = &outcome {
                        warn!(index = idx, "Parallel execution failed: {}", e);
                    }
                    outcomes[idx] = Some(outcome);
                }
                Err(e) => {
                    error!("Execution task failed: {}", e);
                    join_failure = Some(e.to_string());
                }
            }
        }

        let outcomes: Vec<ExecutionOutcome> = outcomes
            .into_iter()
            .map(|outcome| {
                outcome.unwrap_or_else(|| {
                    Err(ExecutorError::TaskJoin(join_failure.clone().unwrap_or_else(|| "task produced no result".to_string())))
                })
            })
            .collect();
        log_summary(&outcomes);
        outcomes
    }
}

fn log_summary(outcomes: &[ExecutionOutcome]) {
    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    info!(total = outcomes.len(), failed, "Parallel batch finished");
}
