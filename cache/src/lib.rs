//! Server-state cache for console views.
//!
//! Results are stored under a [`QueryKey`], served immediately even when
//! stale, and revalidated in the background. Mutations call
//! [`QueryCache::invalidate`] with a key prefix to force observed views to
//! refetch.

mod cache;
mod error;
mod key;
mod observer;

pub use cache::{
    CacheConfig, CacheStats, DEFAULT_GC_TIME, DEFAULT_STALE_TIME, Freshness, QueryCache, Snapshot,
};
pub use error::{CacheError, FetchError};
pub use key::QueryKey;
pub use observer::Observer;
