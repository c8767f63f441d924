/// Resolution Layer
///
/// Turns a transaction holding unresolved intents into one ready for submission:
/// - A fresh `ResolutionContext` per pass, scanned from the transaction inputs
/// - Ordered plugin chains, synchronous (`Resolver`) or awaited one by one (`AsyncResolver`)
/// - Built-in plugins for pure values, cached and remote objects, gas, sender and package names
pub mod async_resolver;
pub mod context;
pub mod plugin;
pub mod plugins;
pub mod policy;
pub mod sync_resolver;

pub use async_resolver::AsyncResolver;
pub use context::{ResolutionContext, UnresolvedInput};
pub use plugin::{AsyncFnPlugin, AsyncResolvePlugin, FnPlugin, ResolvePlugin, SyncPlugin};
pub use plugins::*;
pub use policy::UnresolvedPolicy;
pub use sync_resolver::Resolver;
