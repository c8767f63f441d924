use crate::resolver::context::ResolutionContext;
use crate::resolver::plugin::ResolvePlugin;

/// Sets the sender when the transaction has none, and records the effective sender.
#[derive(Clone, Debug)]
pub struct SenderPlugin {
    sender: String,
}

impl SenderPlugin {
    pub fn new(sender: impl Into<String>) -> Self {
        Self { sender: sender.into() }
    }
}

impl ResolvePlugin for SenderPlugin {
    fn name(&self) -> &str {
        "SenderPlugin"
    }

    fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()> {
        ctx.transaction.set_sender_if_not_set(self.sender.clone());
        ctx.sender = ctx.transaction.sender().map(str::to_string);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    #[test]
    fn test_existing_sender_wins() {
        let mut tx = Transaction::new();
        tx.set_sender("0xowner");
        let mut ctx = ResolutionContext::new(tx);
        SenderPlugin::new("0xdefault").resolve(&mut ctx).unwrap();
        assert_eq!(ctx.sender.as_deref(), Some("0xowner"));

        let mut ctx = ResolutionContext::new(Transaction::new());
        SenderPlugin::new("0xdefault").resolve(&mut ctx).unwrap();
        assert_eq!(ctx.sender.as_deref(), Some("0xdefault"));
        assert_eq!(ctx.transaction.sender(), Some("0xdefault"));
    }
}
