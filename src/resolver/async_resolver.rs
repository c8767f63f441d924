use super::context::ResolutionContext;
use super::plugin::{AsyncFnPlugin, AsyncResolvePlugin, ResolvePlugin, SyncPlugin};
use super::policy::UnresolvedPolicy;
use crate::config::ResolverConfigSection;
use crate::errors::{ResolveError, ResolverPluginError};
use crate::transaction::Transaction;
use futures::future::BoxFuture;
use tracing::{debug, warn};

/// Ordered chain of async plugins. Each plugin is awaited before the next one starts.
#[derive(Default)]
pub struct AsyncResolver {
    plugins: Vec<Box<dyn AsyncResolvePlugin>>,
    policy: UnresolvedPolicy,
}

impl AsyncResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn from_config(config: &ResolverConfigSection) -> Self {
        Self::new().with_policy(config.unresolved_policy)
    }

    pub fn policy(&self) -> UnresolvedPolicy {
        self.policy
    }

    pub fn add_plugin<P: AsyncResolvePlugin + 'static>(&mut self, plugin: P) -> &mut Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn add_sync_plugin<P: ResolvePlugin + 'static>(&mut self, plugin: P) -> &mut Self {
        self.add_plugin(SyncPlugin(plugin))
    }

    pub fn add_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut ResolutionContext) -> BoxFuture<'a, eyre::Result<()>> + Send + Sync + 'static,
    {
        self.add_plugin(AsyncFnPlugin::new(name, f))
    }

    pub fn remove_plugin(&mut self, name: &str) -> usize {
        let before = self.plugins.len();
        self.plugins.retain(|p| p.name() != name);
        before - self.plugins.len()
    }

    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub async fn resolve(&self, transaction: Transaction) -> Result<ResolutionContext, ResolveError> {
        let mut ctx = ResolutionContext::new(transaction);
        debug!(unresolved = ctx.unresolved_count(), plugins = self.plugins.len(), "Starting async resolve pass");

        for (index, plugin) in self.plugins.iter().enumerate() {
            debug!(index, plugin = plugin.name(), "Running resolver plugin");
            if let Err(cause) = plugin.resolve(&mut ctx).await {
                let err = ResolverPluginError::new(index, plugin.name(), cause);
                warn!(index, plugin = plugin.name(), "{}", err);
                return Err(err.into());
            }
        }

        self.policy.enforce(&ctx)?;
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::InputKind;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_async_plugin_appends_descriptor() {
        let mut resolver = AsyncResolver::new();
        resolver.add_fn("append", |ctx| {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                ctx.push_unresolved(InputKind::UnresolvedObject, json!({ "objectId": "0x2" }));
                Ok(())
            })
        });

        let mut tx = Transaction::new();
        tx.object("0x1").unwrap();

        let ctx = resolver.resolve(tx).await.unwrap();
        assert_eq!(ctx.unresolved_count(), 2);
        assert_eq!(ctx.unresolved_inputs[1].input_index, None);
    }

    #[tokio::test]
    async fn test_plugins_are_sequential() {
        let mut resolver = AsyncResolver::new();
        resolver
            .add_fn("slow", |ctx| {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    ctx.set_value("slow", json!(true));
                    Ok(())
                })
            })
            .add_sync_plugin(crate::resolver::FnPlugin::new("check", |ctx: &mut ResolutionContext| {
                ctx.value("slow").map(|_| ()).ok_or_else(|| eyre::eyre!("ran before the slow plugin finished"))
            }));

        assert_eq!(resolver.plugin_names(), vec!["slow", "check"]);
        assert!(resolver.resolve(Transaction::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_failure_is_wrapped() {
        let later_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&later_calls);

        let mut resolver = AsyncResolver::new();
        resolver
            .add_fn("fetch", |_| Box::pin(async { Err(eyre::eyre!("connection reset")) }))
            .add_fn("later", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Ok(()) })
            });

        let err = resolver.resolve(Transaction::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "resolver plugin failed at index 0 (fetch): connection reset");
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }
}
