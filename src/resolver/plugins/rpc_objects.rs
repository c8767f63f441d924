use crate::execution::client::AsyncSubmitClient;
use crate::execution::effects::u64_from_str_or_num;
use crate::resolver::context::ResolutionContext;
use crate::resolver::plugin::AsyncResolvePlugin;
use crate::transaction::{CallArg, InputKind, ObjectRef};
use crate::utils::constants::GET_OBJECT_METHOD;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectData {
    object_id: String,
    #[serde(default, deserialize_with = "u64_from_str_or_num")]
    version: Option<u64>,
    digest: String,
}

/// Fetches the current reference of every unresolved object input from the network.
///
/// Inputs that already name both version and digest are taken as-is without a lookup.
/// A missing object fails the pass.
pub struct RpcObjectResolver<C: ?Sized> {
    client: Arc<C>,
}

impl<C: AsyncSubmitClient + ?Sized> RpcObjectResolver<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    async fn fetch(&self, object_id: &str) -> eyre::Result<ObjectRef> {
        let response = self.client.call(GET_OBJECT_METHOD, vec![json!(object_id), json!({ "showOwner": true })]).await?;
        let body = response.get("result").unwrap_or(&response);

        if let Some(error) = body.get("error") {
            return Err(eyre::eyre!("object {} not found: {}", object_id, error));
        }
        let data = body.get("data").filter(|d| !d.is_null()).ok_or_else(|| eyre::eyre!("object {} not found", object_id))?;
        let data: ObjectData = serde_json::from_value(data.clone())?;
        let version = data.version.ok_or_else(|| eyre::eyre!("object {} has no version", object_id))?;

        Ok(ObjectRef::new(data.object_id, version, data.digest))
    }
}

#[async_trait]
impl<C: AsyncSubmitClient + ?Sized> AsyncResolvePlugin for RpcObjectResolver<C> {
    fn name(&self) -> &str {
        "RpcObjectResolver"
    }

    async fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()> {
        for index in ctx.pending_indices(InputKind::UnresolvedObject) {
            let object_ref = match ctx.transaction.input(index) {
                Some(CallArg::UnresolvedObject { object_id, version: Some(version), digest: Some(digest) }) => {
                    ObjectRef::new(object_id.clone(), *version, digest.clone())
                }
                Some(CallArg::UnresolvedObject { object_id, .. }) => {
                    let object_id = object_id.clone();
                    self.fetch(&object_id).await?
                }
                _ => continue,
            };
            debug!(index, object_id = %object_ref.object_id, version = object_ref.version, "Resolved object");
            ctx.resolve_input(index, CallArg::Object(object_ref))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SubmitError;
    use crate::transaction::Transaction;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ObjectNode {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AsyncSubmitClient for ObjectNode {
        async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, SubmitError> {
            assert_eq!(method, "sui_getObject");
            self.calls.fetch_add(1, Ordering::SeqCst);
            match params[0].as_str() {
                Some("0xabc") => Ok(json!({
                    "jsonrpc": "2.0",
                    "result": { "data": { "objectId": "0xabc", "version": "17", "digest": "Dg" } }
                })),
                Some("0xdown") => Err(SubmitError::Transport("connection refused".to_string())),
                _ => Ok(json!({ "result": { "error": { "code": "notExists" } } })),
            }
        }
    }

    fn node() -> Arc<ObjectNode> {
        Arc::new(ObjectNode { calls: AtomicUsize::new(0) })
    }

    #[tokio::test]
    async fn test_fetches_missing_refs() {
        let client = node();
        let mut tx = Transaction::new();
        tx.object("0xabc").unwrap();
        tx.add_input(CallArg::UnresolvedObject {
            object_id: "0xpinned".to_string(),
            version: Some(3),
            digest: Some("Pd".to_string()),
        })
        .unwrap();

        let mut ctx = ResolutionContext::new(tx);
        RpcObjectResolver::new(Arc::clone(&client)).resolve(&mut ctx).await.unwrap();

        assert_eq!(ctx.transaction.input(0), Some(&CallArg::Object(ObjectRef::new("0xabc", 17, "Dg"))));
        assert_eq!(ctx.transaction.input(1), Some(&CallArg::Object(ObjectRef::new("0xpinned", 3, "Pd"))));
        assert_eq!(ctx.unresolved_count(), 0);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_object_fails() {
        let mut tx = Transaction::new();
        tx.object("0xgone").unwrap();
        let mut ctx = ResolutionContext::new(tx);

        let err = RpcObjectResolver::new(node()).resolve(&mut ctx).await.unwrap_err();
        assert!(err.to_string().contains("object 0xgone not found"));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut tx = Transaction::new();
        tx.object("0xdown").unwrap();
        let mut ctx = ResolutionContext::new(tx);

        let err = RpcObjectResolver::new(node()).resolve(&mut ctx).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
