use super::context::ResolutionContext;
use super::plugin::{FnPlugin, ResolvePlugin};
use super::policy::UnresolvedPolicy;
use crate::config::ResolverConfigSection;
use crate::errors::{ResolveError, ResolverPluginError};
use crate::transaction::Transaction;
use tracing::{debug, warn};

/// Ordered chain of synchronous plugins.
#[derive(Default)]
pub struct Resolver {
    plugins: Vec<Box<dyn ResolvePlugin>>,
    policy: UnresolvedPolicy,
}

impl Resolver {
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

    pub fn add_plugin<P: ResolvePlugin + 'static>(&mut self, plugin: P) -> &mut Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn add_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut ResolutionContext) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.add_plugin(FnPlugin::new(name, f))
    }

    /// Removes every plugin registered under `name`. Returns how many were removed.
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

    /// Runs one pass over `transaction`.
    ///
    /// The first failing plugin aborts the pass; the transaction is not handed back in that case.
    pub fn resolve(&self, transaction: Transaction) -> Result<ResolutionContext, ResolveError> {
        let mut ctx = ResolutionContext::new(transaction);
        debug!(unresolved = ctx.unresolved_count(), plugins = self.plugins.len(), "Starting resolve pass");

        for (index, plugin) in self.plugins.iter().enumerate() {
            debug!(index, plugin = plugin.name(), "Running resolver plugin");
            plugin.resolve(&mut ctx).map_err(|cause| {
                let err = ResolverPluginError::new(index, plugin.name(), cause);
                warn!(index, plugin = plugin.name(), "{}", err);
                err
            })?;
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

    fn with_unresolved(n: usize) -> Transaction {
        let mut tx = Transaction::new();
        for i in 0..n {
            tx.object(format!("0x{:x}", i + 1)).unwrap();
        }
        tx
    }

    #[test]
    fn test_no_plugins_keeps_everything_unresolved() {
        let tx = with_unresolved(3);
        let ctx = Resolver::new().resolve(tx.clone()).unwrap();
        assert_eq!(ctx.unresolved_count(), 3);
        assert_eq!(ctx.into_transaction(), tx);
    }

    #[test]
    fn test_failing_plugin_stops_the_chain() {
        let later_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&later_calls);

        let mut resolver = Resolver::new();
        resolver
            .add_fn("noop", |_| Ok(()))
            .add_fn("broken", |_| Err(eyre::eyre!("object 0x1 not found")))
            .add_fn("later", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        let err = resolver.resolve(with_unresolved(1)).unwrap_err();
        assert!(err.to_string().contains("resolver plugin failed"));

        let plugin_err = err.plugin_error().unwrap();
        assert_eq!(plugin_err.index, 1);
        assert_eq!(plugin_err.plugin_name, "broken");
        assert_eq!(plugin_err.cause_message(), "object 0x1 not found");
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_plugins_run_in_order() {
        let mut resolver = Resolver::new();
        resolver
            .add_fn("first", |ctx| {
                ctx.set_value("order", json!(["first"]));
                Ok(())
            })
            .add_fn("second", |ctx| {
                let seen = ctx.value("order").cloned().ok_or_else(|| eyre::eyre!("first did not run"))?;
                ctx.set_value("order", json!([seen[0], "second"]));
                Ok(())
            });

        let ctx = resolver.resolve(Transaction::new()).unwrap();
        assert_eq!(ctx.value("order"), Some(&json!(["first", "second"])));
        assert_eq!(resolver.plugin_names(), vec!["first", "second"]);
    }

    #[test]
    fn test_remove_plugin() {
        let mut resolver = Resolver::new();
        resolver.add_fn("a", |_| Ok(())).add_fn("b", |_| Ok(())).add_fn("a", |_| Ok(()));
        assert_eq!(resolver.len(), 3);
        assert_eq!(resolver.remove_plugin("a"), 2);
        assert_eq!(resolver.plugin_names(), vec!["b"]);
        assert_eq!(resolver.remove_plugin("missing"), 0);
    }

    #[test]
    fn test_require_resolved_policy() {
        let mut resolver = Resolver::new().with_policy(UnresolvedPolicy::RequireResolved);
        resolver.add_fn("append", |ctx| {
            ctx.push_unresolved(InputKind::UnresolvedObject, json!({ "objectId": "0xfeed" }));
            Ok(())
        });

        let err = resolver.resolve(Transaction::new()).unwrap_err();
        assert!(matches!(err, ResolveError::Unresolved { remaining: 1 }));
        assert!(err.plugin_error().is_none());
    }
}
