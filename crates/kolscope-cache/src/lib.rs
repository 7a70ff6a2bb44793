//! TTL snapshot cache with pluggable key/value backends.
//!
//! Expiry is evaluated on read, so a swapped-in durable backend needs no
//! background sweeper. All time-sensitive operations have `_at` variants
//! taking an explicit clock value.

mod backend;
mod error;
mod store;

pub use backend::{KvBackend, MemoryBackend};
pub use error::CacheError;
pub use store::{Cached, SnapshotCache};
