use crate::resolver::context::ResolutionContext;
use crate::resolver::plugin::ResolvePlugin;
use crate::transaction::{CallArg, InputKind};
use serde_json::Value;
use tracing::debug;

/// Encodes `UnresolvedPure` values into `Pure` bytes.
///
/// Strings become their raw UTF-8 bytes; any other value is encoded as compact JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct NormalizePureInputs;

impl NormalizePureInputs {
    pub fn encode(value: &Value) -> eyre::Result<Vec<u8>> {
        match value {
            Value::String(s) => Ok(s.as_bytes().to_vec()),
            other => Ok(serde_json::to_vec(other)?),
        }
    }
}

impl ResolvePlugin for NormalizePureInputs {
    fn name(&self) -> &str {
        "NormalizePureInputs"
    }

    fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()> {
        for index in ctx.pending_indices(InputKind::UnresolvedPure) {
            let bytes = match ctx.transaction.input(index) {
                Some(CallArg::UnresolvedPure { value }) => Self::encode(value)?,
                _ => continue,
            };
            debug!(index, len = bytes.len(), "Encoded pure input");
            ctx.resolve_input(index, CallArg::Pure { bytes })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;
    use serde_json::json;

    #[test]
    fn test_normalize() {
        let mut tx = Transaction::new();
        tx.pure_value(json!("abc")).unwrap();
        tx.object("0x1").unwrap();
        tx.pure_value(json!({ "amount": 5 })).unwrap();

        let mut ctx = ResolutionContext::new(tx);
        NormalizePureInputs.resolve(&mut ctx).unwrap();

        assert_eq!(ctx.transaction.input(0), Some(&CallArg::Pure { bytes: b"abc".to_vec() }));
        assert_eq!(ctx.transaction.input(2), Some(&CallArg::Pure { bytes: br#"{"amount":5}"#.to_vec() }));
        assert_eq!(ctx.pending_indices(InputKind::UnresolvedObject), vec![1]);
        assert_eq!(ctx.unresolved_count(), 1);
    }
}
