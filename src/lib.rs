// Layered Architecture
pub mod transaction; // Data Layer: transaction model, canonical codec, content digests
pub mod resolver; // Resolution Layer: plugin chains that make unresolved inputs concrete
pub mod execution; // Execution Layer: digest-deduplicated submission, serial and parallel strategies

// Common utilities and types
pub mod config;
pub mod errors;
pub mod utils;

// Re-export key components from each layer
pub use config::{ExecutorConfigSection, PipelineConfig, ResolverConfigSection};
pub use errors::{CodecError, ExecutorError, ResolveError, ResolverPluginError, SubmitError, ValidationError};
pub use execution::{
    AsyncParallelExecutor, AsyncSerialExecutor, AsyncSubmitClient, BlockingExecutor, CachingExecutor, ExecutionOutcome,
    ExecutionResult, Executor, ParallelExecutor, SerialExecutor, SubmitClient, TransactionEffects,
};
pub use resolver::{
    AsyncResolvePlugin, AsyncResolver, ResolutionContext, ResolvePlugin, Resolver, UnresolvedInput, UnresolvedPolicy,
};
pub use transaction::{Argument, CallArg, Command, JsonCodec, Transaction, TransactionCodec, TransactionDigest};
pub use utils::{CacheStats, ObjectCache, ObjectSnapshot};
