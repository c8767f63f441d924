use super::digest::TransactionDigest;
use super::transaction_data::Transaction;
use crate::errors::CodecError;

/// Canonical encoding of a transaction plus the fingerprint derived from it.
pub trait TransactionCodec: Send + Sync {
    fn serialize(&self, transaction: &Transaction) -> Result<Vec<u8>, CodecError>;

    fn digest(&self, bytes: &[u8]) -> TransactionDigest {
        TransactionDigest::of_bytes(bytes)
    }

    fn encode(&self, transaction: &Transaction) -> Result<EncodedTransaction, CodecError> {
        let bytes = self.serialize(transaction)?;
        let digest = self.digest(&bytes);
        Ok(EncodedTransaction { digest, bytes })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedTransaction {
    pub digest: TransactionDigest,
    pub bytes: Vec<u8>,
}

/// Compact JSON encoding with SHA-256 digests.
///
/// Field order follows the struct definitions and JSON objects inside command payloads
/// are key-sorted by `serde_json`, so equal transactions always produce equal bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl TransactionCodec for JsonCodec {
    fn serialize(&self, transaction: &Transaction) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(transaction)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transfer(recipient: &str) -> Transaction {
        let mut tx = Transaction::new();
        tx.set_sender("0xabc");
        let coin = tx.object("0x1").unwrap();
        tx.move_call("0x2::pay::split_and_transfer", vec![coin], vec![]).unwrap();
        tx.pure_value(json!({ "recipient": recipient, "amount": 10 })).unwrap();
        tx
    }

    #[test]
    fn test_equal_transactions_share_digest() {
        let codec = JsonCodec;
        let a = codec.encode(&transfer("0xdef")).unwrap();
        let b = codec.encode(&transfer("0xdef")).unwrap();
        let c = codec.encode(&transfer("0xfed")).unwrap();

        assert_eq!(a, b);
        assert_ne!(a.digest, c.digest);
    }

    #[test]
    fn test_serialized_form_is_json() {
        let bytes = JsonCodec.serialize(&transfer("0xdef")).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["sender"], "0xabc");
        assert_eq!(value["inputs"][0]["$kind"], "UnresolvedObject");
    }
}
