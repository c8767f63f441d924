/// JSON-RPC method used to submit signed transaction bytes.
pub const EXECUTE_TRANSACTION_METHOD: &str = "sui_executeTransactionBlock";

/// JSON-RPC method used to look up an object's current version and owner.
pub const GET_OBJECT_METHOD: &str = "sui_getObject";

/// JSON-RPC method listing the coins of one type owned by an address, one page at a time.
pub const GET_COINS_METHOD: &str = "suix_getCoins";

pub const DEFAULT_MAX_WORKERS: usize = 4;

pub const MAX_GAS_BUDGET: u64 = 50_000_000_000;

pub const DEFAULT_GAS_PRICE: u64 = 1_000;
