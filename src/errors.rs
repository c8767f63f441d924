use eyre::Report;
use serde_json::{Value, json};
use std::time::Duration;

/// A resolver plugin returned an error; the pass was aborted at `index`.
#[derive(Debug, thiserror::Error)]
#[error("resolver plugin failed at index {index} ({plugin_name}): {cause}")]
pub struct ResolverPluginError {
    pub index: usize,
    pub plugin_name: String,
    pub cause: Report,
}

impl ResolverPluginError {
    pub fn new(index: usize, plugin_name: impl Into<String>, cause: Report) -> Self {
        Self { index, plugin_name: plugin_name.into(), cause }
    }

    pub fn cause_message(&self) -> String {
        self.cause.to_string()
    }

    /// Structured form of the error, suitable for logging or returning over an API.
    pub fn to_json(&self) -> Value {
        json!({
            "error_type": "ResolverPluginError",
            "index": self.index,
            "plugin_name": self.plugin_name,
            "cause_message": self.cause_message(),
            "message": self.to_string(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Plugin(#[from] ResolverPluginError),
    #[error("{remaining} unresolved input(s) left after all plugins ran")]
    Unresolved { remaining: usize },
}

impl ResolveError {
    pub fn plugin_error(&self) -> Option<&ResolverPluginError> {
        match self {
            ResolveError::Plugin(err) => Some(err),
            ResolveError::Unresolved { .. } => None,
        }
    }
}

/// Failure of the submit capability. Never cached, so always retryable.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmitError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to serialize transaction: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("invalid execution response: {0}")]
    InvalidResponse(String),
    #[error("worker pool error: {0}")]
    WorkerPool(String),
    #[error("execution task failed: {0}")]
    TaskJoin(String),
    #[error("blocking execution cannot run on a current-thread tokio runtime; use the async executor")]
    BlockingInRuntime,
}

impl ExecutorError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExecutorError::Submit(_) | ExecutorError::TaskJoin(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("input {index} is still unresolved ({kind})")]
    UnresolvedInput { index: usize, kind: String },
    #[error("command {command} references input {input} but only {len} input(s) exist")]
    InputOutOfBounds { command: usize, input: usize, len: usize },
    #[error("command {command} references result {result} which is not produced by an earlier command")]
    ResultOutOfBounds { command: usize, result: usize },
    #[error("invalid cache key: {0:?}")]
    InvalidCacheKey(String),
    #[error("transaction already has {len} input(s); an argument index is limited to {}", u16::MAX)]
    TooManyInputs { len: usize },
    #[error("transaction already has {len} command(s); a result index is limited to {}", u16::MAX)]
    TooManyCommands { len: usize },
}
