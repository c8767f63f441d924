use super::caching_executor::{BlockingExecutor, ExecutionOutcome, Executor};
use crate::transaction::Transaction;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs transactions one at a time on the calling thread, in order.
///
/// A failure is recorded in its slot and the remaining transactions still run.
pub struct SerialExecutor<E: ?Sized> {
    inner: Arc<E>,
}

impl<E: BlockingExecutor + ?Sized> SerialExecutor<E> {
    pub fn new(inner: Arc<E>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<E> {
        &self.inner
    }

    pub fn execute(&self, transactions: &[Transaction]) -> Vec<ExecutionOutcome> {
        debug!(count = transactions.len(), "Executing transactions serially");
        let outcomes: Vec<ExecutionOutcome> = transactions
            .iter()
            .enumerate()
            .map(|(idx, tx)| {
                let outcome = self.inner.execute_blocking(tx);
                if let Err(e) = &outcome {
                    warn!(index = idx, "Serial execution failed: {}", e);
                }
                outcome
            })
            .collect();
        log_summary(&outcomes);
        outcomes
    }
}

/// Awaits each transaction before starting the next one.
pub struct AsyncSerialExecutor<E: ?Sized> {
    inner: Arc<E>,
}

impl<E: Executor + ?Sized> AsyncSerialExecutor<E> {
    pub fn new(inner: Arc<E>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<E> {
        &self.inner
    }

    pub async fn execute(&self, transactions: &[Transaction]) -> Vec<ExecutionOutcome> {
        debug!(count = transactions.len(), "Executing transactions serially");
        let mut outcomes = Vec::with_capacity(transactions.len());
        for (idx, tx) in transactions.iter().enumerate() {
            let outcome = self.inner.execute(tx).await;
            if let Err(e) = &outcome {
                warn!(index = idx, "Serial execution failed: {}", e);
            }
            outcomes.push(outcome);
        }
        log_summary(&outcomes);
        outcomes
    }
}

fn log_summary(outcomes: &[ExecutionOutcome]) {
    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    info!(total = outcomes.len(), failed, "Serial batch finished");
}
