use super::client::{AsyncSubmitClient, SubmitClient};
use super::effects::ExecutionResult;
use crate::config::ExecutorConfigSection;
use crate::errors::{CodecError, ExecutorError};
use crate::transaction::{EncodedTransaction, JsonCodec, Transaction, TransactionCodec, TransactionDigest};
use crate::utils::cache::{CacheStats, ObjectCache};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dashmap::DashMap;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub type ExecutionOutcome = Result<ExecutionResult, ExecutorError>;

/// Executes one transaction on the calling thread.
///
/// Implementations block on the network. Called from a multi-thread tokio runtime, the wait
/// is moved off the worker with `block_in_place`. A current-thread runtime cannot do that,
/// so the call fails with [`ExecutorError::BlockingInRuntime`]; use [`Executor`] there.
pub trait BlockingExecutor: Send + Sync {
    fn execute_blocking(&self, transaction: &Transaction) -> ExecutionOutcome;
}

#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, transaction: &Transaction) -> ExecutionOutcome;
}

/// One record per digest. The mutex is held for the whole submission so concurrent
/// requesters of the same content wait for the first one instead of submitting again.
/// `None` means nothing has been recorded yet, or the last attempt failed.
type RecordSlot = Arc<Mutex<Option<ExecutionResult>>>;

/// Deduplicates submissions by content digest and applies effects to the object cache.
///
/// Blocking and async callers share the same records, so wrapping one instance in any mix of
/// serial and parallel executors still yields at most one submission per unique transaction.
pub struct CachingExecutor<C: ?Sized> {
    client: Arc<C>,
    codec: Arc<dyn TransactionCodec>,
    object_cache: Arc<ObjectCache>,
    records: DashMap<TransactionDigest, RecordSlot>,
    config: ExecutorConfigSection,
    submissions: AtomicU64,
    pub stats: CacheStats,
}

impl<C: ?Sized> CachingExecutor<C> {
    pub fn new(client: Arc<C>, object_cache: Arc<ObjectCache>) -> Self {
        Self {
            client,
            codec: Arc::new(JsonCodec),
            object_cache,
            records: DashMap::new(),
            config: ExecutorConfigSection::default(),
            submissions: AtomicU64::new(0),
            stats: CacheStats::default(),
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn TransactionCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_config(mut self, config: ExecutorConfigSection) -> Self {
        self.config = config;
        self
    }

    pub fn object_cache(&self) -> &Arc<ObjectCache> {
        &self.object_cache
    }

    pub fn config(&self) -> &ExecutorConfigSection {
        &self.config
    }

    /// Number of calls made to the submit capability, failed ones included.
    pub fn submissions(&self) -> u64 {
        self.submissions.load(Ordering::Relaxed)
    }

    /// Cache key the wrapped codec derives for `transaction`.
    pub fn digest_of(&self, transaction: &Transaction) -> Result<TransactionDigest, CodecError> {
        Ok(self.codec.encode(transaction)?.digest)
    }

    /// Recorded result for `digest`, if any. Returns `None` while a submission is in flight.
    pub fn cached_result(&self, digest: &TransactionDigest) -> Option<ExecutionResult> {
        let slot = self.records.get(digest).map(|entry| Arc::clone(entry.value()))?;
        let guard = slot.try_lock().ok()?;
        guard.clone()
    }

    /// Forgets the record for `digest` so the next execution submits again.
    pub fn evict(&self, digest: &TransactionDigest) -> bool {
        let removed = self.records.remove(digest).is_some();
        if removed {
            self.stats.record_eviction();
        }
        removed
    }

    pub fn reset(&self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn slot(&self, digest: TransactionDigest) -> RecordSlot {
        Arc::clone(self.records.entry(digest).or_default().value())
    }

    fn submit_params(&self, encoded: &EncodedTransaction) -> Vec<Value> {
        vec![Value::String(STANDARD.encode(&encoded.bytes)), json!({ "showEffects": self.config.show_effects })]
    }

    fn cached(&self, digest: &TransactionDigest, record: &Option<ExecutionResult>) -> Option<ExecutionResult> {
        match record {
            Some(result) => {
                self.stats.record_hit();
                debug!(%digest, "Execution cache hit");
                Some(result.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Parses the response and applies its effects. Nothing is recorded if parsing fails.
    fn complete(&self, digest: &TransactionDigest, response: Value) -> ExecutionOutcome {
        let result = ExecutionResult::from_response(response)?;
        if let Some(effects) = &result.effects {
            self.object_cache.apply_effects(effects);
        }
        info!(%digest, tx_digest = %result.digest, success = result.is_success(), "Transaction executed");
        Ok(result)
    }
}

impl<C: SubmitClient + ?Sized> CachingExecutor<C> {
    fn submit_blocking(&self, transaction: &Transaction) -> ExecutionOutcome {
        let encoded = self.codec.encode(transaction)?;
        let slot = self.slot(encoded.digest);
        let mut record = slot.blocking_lock();

        if let Some(result) = self.cached(&encoded.digest, &record) {
            return Ok(result);
        }

        self.submissions.fetch_add(1, Ordering::Relaxed);
        let response = self.client.call(&self.config.execute_method, self.submit_params(&encoded)).inspect_err(|e| {
            warn!(digest = %encoded.digest, "Submit failed: {}", e);
        })?;

        let result = self.complete(&encoded.digest, response)?;
        *record = Some(result.clone());
        Ok(result)
    }
}

impl<C: SubmitClient + ?Sized> BlockingExecutor for CachingExecutor<C> {
    fn execute_blocking(&self, transaction: &Transaction) -> ExecutionOutcome {
        match Handle::try_current() {
            Err(_) => self.submit_blocking(transaction),
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.submit_blocking(transaction))
            }
            Ok(_) => {
                warn!("Blocking execution requested on a current-thread runtime");
                Err(ExecutorError::BlockingInRuntime)
            }
        }
    }
}

#[async_trait]
impl<C: AsyncSubmitClient + ?Sized> Executor for CachingExecutor<C> {
    async fn execute(&self, transaction: &Transaction) -> ExecutionOutcome {
        let encoded = self.codec.encode(transaction)?;
        let slot = self.slot(encoded.digest);
        let mut record = slot.lock().await;

        if let Some(result) = self.cached(&encoded.digest, &record) {
            return Ok(result);
        }

        self.submissions.fetch_add(1, Ordering::Relaxed);
        let response = self
            .client
            .call(&self.config.execute_method, self.submit_params(&encoded))
            .await
            .inspect_err(|e| warn!(digest = %encoded.digest, "Submit failed: {}", e))?;

        let result = self.complete(&encoded.digest, response)?;
        *record = Some(result.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SubmitError;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    struct CountingClient {
        calls: AtomicUsize,
    }

    impl SubmitClient for CountingClient {
        fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, SubmitError> {
            assert_eq!(method, "sui_executeTransactionBlock");
            assert_eq!(params[1], json!({ "showEffects": true }));
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({
                "digest": format!("tx-{}", n),
                "effects": {
                    "status": { "status": "success" },
                    "changedObjects": [{ "objectId": "0xabc", "outputState": "ObjectWrite", "outputVersion": 2, "outputDigest": "d2" }]
                }
            }))
        }
    }

    fn transfer(amount: u64) -> Transaction {
        let mut tx = Transaction::new();
        tx.set_sender("0x1");
        tx.pure(amount.to_le_bytes()).unwrap();
        tx
    }

    #[test]
    fn test_records_and_stats() {
        let client = Arc::new(CountingClient { calls: AtomicUsize::new(0) });
        let executor = CachingExecutor::new(Arc::clone(&client), Arc::new(ObjectCache::new()));

        let first = executor.execute_blocking(&transfer(1)).unwrap();
        let second = executor.execute_blocking(&transfer(1)).unwrap();
        assert_eq!(first, second);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(executor.submissions(), 1);
        assert_eq!(executor.stats.hits.load(Ordering::Relaxed), 1);
        assert_eq!(executor.stats.misses.load(Ordering::Relaxed), 1);
        assert_eq!(executor.len(), 1);

        let digest = executor.digest_of(&transfer(1)).unwrap();
        assert_eq!(executor.cached_result(&digest).map(|r| r.digest), Some("tx-0".to_string()));
        assert!(executor.object_cache().get_owned_object("0xabc").is_some());
    }

    #[test]
    fn test_evict_resubmits() {
        let client = Arc::new(CountingClient { calls: AtomicUsize::new(0) });
        let executor = CachingExecutor::new(Arc::clone(&client), Arc::new(ObjectCache::new()));
        let tx = transfer(7);
        let digest = JsonCodec.encode(&tx).unwrap().digest;

        executor.execute_blocking(&tx).unwrap();
        assert!(executor.evict(&digest));
        assert!(!executor.evict(&digest));
        let again = executor.execute_blocking(&tx).unwrap();

        assert_eq!(again.digest, "tx-1");
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);

        executor.reset();
        assert!(executor.is_empty());
    }

    #[test]
    fn test_invalid_response_is_not_recorded() {
        struct BrokenClient;
        impl SubmitClient for BrokenClient {
            fn call(&self, _method: &str, _params: Vec<Value>) -> Result<Value, SubmitError> {
                Ok(json!({ "unexpected": true }))
            }
        }

        let executor = CachingExecutor::new(Arc::new(BrokenClient), Arc::new(ObjectCache::new()));
        let tx = transfer(1);
        assert!(matches!(executor.execute_blocking(&tx), Err(ExecutorError::InvalidResponse(_))));
        assert!(matches!(executor.execute_blocking(&tx), Err(ExecutorError::InvalidResponse(_))));
        assert_eq!(executor.submissions(), 2);
        assert!(executor.cached_result(&JsonCodec.encode(&tx).unwrap().digest).is_none());
    }
}
