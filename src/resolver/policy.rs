use super::context::ResolutionContext;
use crate::errors::ResolveError;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::warn;

/// What a resolver does when a pass succeeds but unresolved inputs remain.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Return the context anyway; callers can check with `Transaction::assert_fully_resolved`.
    #[default]
    Permissive,
    /// Fail with [`ResolveError::Unresolved`].
    RequireResolved,
}

impl UnresolvedPolicy {
    pub(crate) fn enforce(&self, ctx: &ResolutionContext) -> Result<(), ResolveError> {
        let remaining = ctx.remaining();
        if remaining == 0 {
            return Ok(());
        }
        match self {
            UnresolvedPolicy::Permissive => {
                warn!(remaining, "Resolve pass finished with unresolved inputs");
                Ok(())
            }
            UnresolvedPolicy::RequireResolved => Err(ResolveError::Unresolved { remaining }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;
    use std::str::FromStr;

    #[test]
    fn test_parse() {
        assert_eq!(UnresolvedPolicy::from_str("require_resolved").unwrap(), UnresolvedPolicy::RequireResolved);
        assert_eq!(UnresolvedPolicy::Permissive.to_string(), "permissive");
        assert!(UnresolvedPolicy::from_str("strict").is_err());
    }

    #[test]
    fn test_enforce() {
        let mut tx = Transaction::new();
        tx.object("0x1").unwrap();
        let ctx = ResolutionContext::new(tx);

        assert!(UnresolvedPolicy::Permissive.enforce(&ctx).is_ok());
        assert!(matches!(
            UnresolvedPolicy::RequireResolved.enforce(&ctx),
            Err(ResolveError::Unresolved { remaining: 1 })
        ));
        assert!(UnresolvedPolicy::RequireResolved.enforce(&ResolutionContext::new(Transaction::new())).is_ok());
    }

    #[test]
    fn test_pending_coin_counts_as_unresolved() {
        let mut tx = Transaction::new();
        tx.coin_with_balance("0x2::sui::SUI", 100).unwrap();
        let ctx = ResolutionContext::new(tx);

        assert!(matches!(
            UnresolvedPolicy::RequireResolved.enforce(&ctx),
            Err(ResolveError::Unresolved { remaining: 1 })
        ));
    }
}
