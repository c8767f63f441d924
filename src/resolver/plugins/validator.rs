use crate::resolver::context::ResolutionContext;
use crate::resolver::plugin::ResolvePlugin;
use crate::transaction::Transaction;

type Check = Box<dyn Fn(&Transaction) -> eyre::Result<()> + Send + Sync>;

/// Runs a caller-supplied check against the transaction without modifying it.
pub struct ValidatorPlugin {
    name: String,
    check: Check,
}

impl ValidatorPlugin {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Transaction) -> eyre::Result<()> + Send + Sync + 'static,
    {
        Self { name: name.into(), check: Box::new(check) }
    }

    /// Rejects transactions with unresolved inputs or dangling command references.
    pub fn fully_resolved() -> Self {
        Self::new("FullyResolvedValidator", |tx| {
            tx.assert_fully_resolved()?;
            tx.validate_references()?;
            Ok(())
        })
    }
}

impl ResolvePlugin for ValidatorPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()> {
        (self.check)(&ctx.transaction)
    }
}
