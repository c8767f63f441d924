pub mod cache;
pub mod config_loader;
pub mod constants;

pub use cache::{CacheSizes, CacheStats, ObjectCache, ObjectSnapshot};
pub use config_loader::*;
pub use constants::*;
