/// Execution Layer
///
/// This layer is responsible for:
/// - Submitting encoded transactions through a pluggable submit capability
/// - Deduplicating and coalescing submissions by content digest
/// - Applying transaction effects to the shared object cache
/// - Running batches serially or on a bounded worker pool
pub mod caching_executor;
pub mod client;
pub mod effects;
pub mod parallel;
pub mod serial;


pub use caching_executor::{BlockingExecutor, CachingExecutor, ExecutionOutcome, Executor};
pub use client::{AsyncSubmitClient, SubmitClient};
pub use effects::{ChangedObject, ExecutionResult, ExecutionStatus, OutputState, TransactionEffects};
pub use parallel::{AsyncParallelExecutor, ParallelExecutor};
pub use serial::{AsyncSerialExecutor, SerialExecutor};
