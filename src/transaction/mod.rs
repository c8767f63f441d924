/// Transaction model
///
/// The data the pipeline moves around: inputs (concrete or still unresolved), commands,
/// the canonical codec and the content digest used as the execution cache key.
pub mod codec;
pub mod digest;
pub mod inputs;
pub mod transaction_data;

pub use codec::{EncodedTransaction, JsonCodec, TransactionCodec};
pub use digest::TransactionDigest;
pub use inputs::{Argument, CallArg, Command, InputKind, ObjectRef};
pub use transaction_data::{GasConfig, Transaction};
