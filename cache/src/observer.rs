use std::marker::PhantomData;

use tokio::sync::watch;

use crate::{CacheError, QueryCache, QueryKey, Snapshot};

/// Active interest in one cache entry, the equivalent of a mounted view.
///
/// Observed entries are refetched on invalidation and never garbage
/// collected. Dropping the observer releases it.
pub struct Observer<T> {
    cache: QueryCache,
    key: QueryKey,
    entry_id: u64,
    rx: watch::Receiver<u64>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Observer<T> {
    pub(crate) fn new(
        cache: QueryCache,
        key: QueryKey,
        entry_id: u64,
        rx: watch::Receiver<u64>,
    ) -> Self {
        Self {
            cache,
            key,
            entry_id,
            rx,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl<T: Send + Sync + 'static> Observer<T> {
    pub fn snapshot(&self) -> Result<Snapshot<T>, CacheError> {
        self.cache
            .get(&self.key)?
            .ok_or_else(|| CacheError::Removed {
                key: self.key.clone(),
            })
    }

    /// Wait for the next change to the entry: a fetch starting or finishing,
    /// an invalidation, or a hydration.
    pub async fn changed(&mut self) -> Result<Snapshot<T>, CacheError> {
        self.rx.changed().await.map_err(|_| CacheError::Removed {
            key: self.key.clone(),
        })?;
        self.snapshot()
    }

    /// Wait until no fetch is in flight for the entry.
    pub async fn settled(&mut self) -> Result<Snapshot<T>, CacheError> {
        loop {
            drop(self.rx.borrow_and_update());
            let snapshot = self.snapshot()?;
            if !snapshot.fetching {
                return Ok(snapshot);
            }
            self.rx.changed().await.map_err(|_| CacheError::Removed {
                key: self.key.clone(),
            })?;
        }
    }
}

impl<T> Drop for Observer<T> {
    fn drop(&mut self) {
        self.cache.inner.release_observer(&self.key, self.entry_id);
    }
}

impl<T> std::fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer").field("key", &self.key).finish()
    }
}
