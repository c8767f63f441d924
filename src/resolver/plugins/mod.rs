pub mod cached_objects;
pub mod coin_with_balance;
pub mod gas;
pub mod named_packages;
pub mod pure_inputs;
pub mod rpc_objects;
pub mod sender;
pub mod validator;

pub use cached_objects::CachedObjectResolver;
pub use coin_with_balance::CoinWithBalanceResolver;
pub use gas::GasDefaultsPlugin;
pub use named_packages::NamedPackagesPlugin;
pub use pure_inputs::NormalizePureInputs;
pub use rpc_objects::RpcObjectResolver;
pub use sender::SenderPlugin;
pub use validator::ValidatorPlugin;
