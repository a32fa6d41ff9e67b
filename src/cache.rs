//! Time-expiring cache of complete search responses.
//!
//! Responses are keyed by a [`Fingerprint`] of the request, so requests that
//! differ only in filter construction order share an entry. Expired entries
//! are dropped lazily on read and periodically by a [`CacheSweeper`].

pub mod config;
pub mod fingerprint;
pub mod result_cache;
pub mod sweeper;

pub use config::CacheConfig;
pub use fingerprint::Fingerprint;
pub use result_cache::{CacheEntry, CacheStats, ResultCache};
pub use sweeper::{CacheSweeper, SweeperHandle};
