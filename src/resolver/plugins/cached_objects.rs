use crate::resolver::context::ResolutionContext;
use crate::resolver::plugin::ResolvePlugin;
use crate::transaction::{CallArg, InputKind};
use crate::utils::cache::ObjectCache;
use std::sync::Arc;
use tracing::debug;

/// Resolves object inputs from the owned-object bucket of a shared cache.
///
/// Objects not in the cache are left for later plugins. The cache is never written.
pub struct CachedObjectResolver {
    cache: Arc<ObjectCache>,
}

impl CachedObjectResolver {
    pub fn new(cache: Arc<ObjectCache>) -> Self {
        Self { cache }
    }
}

impl ResolvePlugin for CachedObjectResolver {
    fn name(&self) -> &str {
        "CachedObjectResolver"
    }

    fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()> {
        for index in ctx.pending_indices(InputKind::UnresolvedObject) {
            let Some(object_id) = ctx.transaction.input(index).and_then(CallArg::object_id) else {
                continue;
            };
            if let Some(snapshot) = self.cache.get_owned_object(object_id) {
                debug!(index, object_id = %snapshot.object_id, version = snapshot.version, "Resolved object from cache");
                ctx.resolve_input(index, CallArg::Object(snapshot.object_ref()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{ObjectRef, Transaction};
    use crate::utils::cache::ObjectSnapshot;

    #[test]
    fn test_resolves_only_cached_objects() {
        let cache = Arc::new(ObjectCache::new());
        cache.set_owned_object(ObjectSnapshot::new("0xabc", 4, "dig"));

        let mut tx = Transaction::new();
        tx.object("0xabc").unwrap();
        tx.object("0xdef").unwrap();

        let mut ctx = ResolutionContext::new(tx);
        CachedObjectResolver::new(Arc::clone(&cache)).resolve(&mut ctx).unwrap();

        assert_eq!(ctx.transaction.input(0), Some(&CallArg::Object(ObjectRef::new("0xabc", 4, "dig"))));
        assert_eq!(ctx.pending_indices(InputKind::UnresolvedObject), vec![1]);
        assert_eq!(cache.sizes().owned_objects, 1);
    }
}
