//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and snapshot persistence.

mod entry;
pub mod snapshot;
mod stats;
mod store;
mod value;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{compute_expiry, current_timestamp_nanos, CacheEntry, Expiration};
pub use stats::CacheStats;
pub(crate) use store::StoreInner;
pub use store::CacheStore;
pub use value::{Value, MAX_VALUE_DEPTH};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
