use crate::errors::SubmitError;
use async_trait::async_trait;
use serde_json::Value;

/// Blocking submit capability: the only way the pipeline talks to the network.
///
/// Transport timeouts and connection failures are reported as [`SubmitError`]; the executor
/// never caches them.
pub trait SubmitClient: Send + Sync {
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, SubmitError>;
}

/// Future-returning submit capability.
#[async_trait]
pub trait AsyncSubmitClient: Send + Sync {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, SubmitError>;
}
