use std::sync::Arc;

use thiserror::Error;

use crate::QueryKey;

/// A fetch failure shared between every reader that joined the fetch.
pub type FetchError = Arc<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The fetcher for `key` returned an error.
    #[error("fetch for {key} failed: {error}")]
    Fetch { key: QueryKey, error: FetchError },

    /// The entry holds a value of another type than the one requested.
    #[error("cached value for {key} has a different type")]
    TypeMismatch { key: QueryKey },

    /// Fetches are driven by tokio tasks.
    #[error("no tokio runtime to drive the fetch for {key}")]
    NoRuntime { key: QueryKey },

    /// The entry an observer was attached to has been removed.
    #[error("cache entry for {key} was removed")]
    Removed { key: QueryKey },
}

impl CacheError {
    /// The fetcher's own error, for callers that want to downcast it back to
    /// their transport error type.
    pub fn fetch_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Fetch { error, .. } => Some(error.as_ref()),
            _ => None,
        }
    }
}
