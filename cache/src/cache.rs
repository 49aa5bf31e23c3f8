use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::{CacheError, FetchError};
use crate::observer::Observer;
use crate::QueryKey;

/// How long a fetched or hydrated value counts as fresh.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(60);

/// How long an unobserved, idle entry survives garbage collection.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

pub(crate) type Payload = Arc<dyn Any + Send + Sync>;
type FetchResult = Result<Payload, FetchError>;
type FetchFuture = Shared<BoxFuture<'static, FetchResult>>;
type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchResult> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub stale_time: Duration,
    pub gc_time: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
        }
    }
}

/// Age class of a cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Nothing has been fetched or hydrated yet.
    Empty,
    Fresh,
    /// Older than the stale time, or invalidated.
    Stale,
}

/// Point-in-time view of one entry.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    /// Last known value, served even when stale.
    pub value: Option<Arc<T>>,
    pub freshness: Freshness,
    /// A fetch for this key is in flight.
    pub fetching: bool,
    pub updated_at: Option<Instant>,
    /// Error of the most recent fetch, cleared by the next success.
    pub error: Option<FetchError>,
}

impl<T> Snapshot<T> {
    pub fn data(&self) -> Option<&T> {
        self.value.as_deref()
    }

    /// No value yet and a fetch is underway.
    pub fn is_loading(&self) -> bool {
        self.value.is_none() && self.fetching
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub in_flight: usize,
    /// Total fetches started since the cache was created.
    pub fetches_started: u64,
}

struct InFlight {
    started_epoch: u64,
    future: FetchFuture,
}

struct Entry {
    /// Distinguishes a re-created entry from a removed one with the same key.
    id: u64,
    value: Option<Payload>,
    updated_at: Option<Instant>,
    /// Epoch of the latest invalidation not yet satisfied by a fetch.
    invalidated_epoch: Option<u64>,
    error: Option<FetchError>,
    in_flight: Option<InFlight>,
    /// Refetch once the in-flight fetch completes.
    follow_up: bool,
    /// Fetcher of the most recent read, used to refetch observed keys.
    fetcher: Option<Fetcher>,
    observers: usize,
    last_used: Instant,
    version: watch::Sender<u64>,
}

impl Entry {
    fn new(id: u64, now: Instant) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            id,
            value: None,
            updated_at: None,
            invalidated_epoch: None,
            error: None,
            in_flight: None,
            follow_up: false,
            fetcher: None,
            observers: 0,
            last_used: now,
            version,
        }
    }

    fn freshness(&self, now: Instant, stale_time: Duration) -> Freshness {
        match (&self.value, self.updated_at) {
            (Some(_), Some(updated_at)) => {
                if self.invalidated_epoch.is_some()
                    || now.saturating_duration_since(updated_at) >= stale_time
                {
                    Freshness::Stale
                } else {
                    Freshness::Fresh
                }
            }
            _ => Freshness::Empty,
        }
    }

    fn needs_fetch(&self, now: Instant, stale_time: Duration) -> bool {
        self.in_flight.is_none() && self.freshness(now, stale_time) != Freshness::Fresh
    }

    fn notify(&self) {
        self.version.send_modify(|version| *version += 1);
    }

    fn snapshot<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
        now: Instant,
        stale_time: Duration,
    ) -> Result<Snapshot<T>, CacheError> {
        let value = self
            .value
            .clone()
            .map(|payload| downcast::<T>(key, payload))
            .transpose()?;
        Ok(Snapshot {
            value,
            freshness: self.freshness(now, stale_time),
            fetching: self.in_flight.is_some(),
            updated_at: self.updated_at,
            error: self.error.clone(),
        })
    }
}

#[derive(Default)]
pub(crate) struct Store {
    entries: HashMap<QueryKey, Entry>,
    /// Orders fetch starts against invalidations.
    epoch: u64,
    next_entry_id: u64,
    fetches_started: u64,
}

impl Store {
    fn tick(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    fn entry(&mut self, key: &QueryKey, now: Instant) -> &mut Entry {
        let next_id = &mut self.next_entry_id;
        self.entries.entry(key.clone()).or_insert_with(|| {
            *next_id += 1;
            Entry::new(*next_id, now)
        })
    }
}

pub(crate) struct CacheInner {
    store: Mutex<Store>,
    config: CacheConfig,
}

impl CacheInner {
    /// The store lock is never held across an await point, so a poisoned
    /// lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_fetch(
        self: &Arc<Self>,
        store: &mut Store,
        key: &QueryKey,
        fetcher: Fetcher,
    ) -> Result<FetchFuture, CacheError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| CacheError::NoRuntime { key: key.clone() })?;

        let started_epoch = store.tick();
        store.fetches_started += 1;

        let weak = Arc::downgrade(self);
        let commit_key = key.clone();
        let future = async move {
            let result = fetcher().await;
            if let Some(inner) = weak.upgrade() {
                inner.complete(&commit_key, started_epoch, &result);
            }
            result
        }
        .boxed()
        .shared();

        let entry = store.entry(key, Instant::now());
        entry.in_flight = Some(InFlight {
            started_epoch,
            future: future.clone(),
        });
        entry.notify();
        tracing::debug!(%key, epoch = started_epoch, "cache fetch started");

        // Detached: the fetch completes into the cache even if every reader
        // goes away.
        runtime.spawn(future.clone());
        Ok(future)
    }

    fn complete(self: &Arc<Self>, key: &QueryKey, started_epoch: u64, result: &FetchResult) {
        let mut store = self.lock();
        let now = Instant::now();

        let follow_up = {
            let Some(entry) = store.entries.get_mut(key) else {
                tracing::debug!(%key, "cache entry removed before fetch completed");
                return;
            };
            if entry.in_flight.as_ref().map(|f| f.started_epoch) != Some(started_epoch) {
                return;
            }
            entry.in_flight = None;

            match result {
                Ok(value) => {
                    entry.value = Some(Arc::clone(value));
                    entry.updated_at = Some(now);
                    entry.error = None;
                    // Invalidations issued after this fetch started still stand.
                    if entry
                        .invalidated_epoch
                        .is_some_and(|epoch| epoch < started_epoch)
                    {
                        entry.invalidated_epoch = None;
                    }
                    tracing::debug!(%key, epoch = started_epoch, "cache fetch completed");
                }
                Err(error) => {
                    entry.error = Some(Arc::clone(error));
                    tracing::warn!(%key, "cache fetch failed: {error}");
                }
            }
            entry.notify();

            let follow_up =
                std::mem::take(&mut entry.follow_up) && entry.invalidated_epoch.is_some();
            if follow_up {
                entry.fetcher.clone()
            } else {
                None
            }
        };

        if let Some(fetcher) = follow_up
            && let Err(e) = self.start_fetch(&mut store, key, fetcher)
        {
            tracing::warn!(%key, "follow-up fetch not started: {e}");
        }
    }

    pub(crate) fn snapshot<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
    ) -> Result<Option<Snapshot<T>>, CacheError> {
        let store = self.lock();
        store
            .entries
            .get(key)
            .map(|entry| entry.snapshot(key, Instant::now(), self.config.stale_time))
            .transpose()
    }

    pub(crate) fn release_observer(&self, key: &QueryKey, entry_id: u64) {
        let mut store = self.lock();
        if let Some(entry) = store.entries.get_mut(key)
            && entry.id == entry_id
        {
            entry.observers = entry.observers.saturating_sub(1);
            if entry.observers == 0 {
                entry.last_used = Instant::now();
            }
        }
    }
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, payload: Payload) -> Result<Arc<T>, CacheError> {
    payload
        .downcast::<T>()
        .map_err(|_| CacheError::TypeMismatch { key: key.clone() })
}

fn erase<T, F, Fut, E>(fetcher: F) -> Fetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    Arc::new(move || {
        let fut = fetcher();
        async move {
            fut.await
                .map(|value| Arc::new(value) as Payload)
                .map_err(|error| Arc::new(error) as FetchError)
        }
        .boxed()
    })
}

/// Process-wide store of query results keyed by [`QueryKey`].
///
/// Serves stale-while-revalidate reads, deduplicates concurrent fetches of
/// the same key, and refetches observed keys on invalidation. Clones share
/// the same store.
///
/// Fetches run as tokio tasks, so every method that may start one must be
/// called from within a runtime.
#[derive(Clone)]
pub struct QueryCache {
    pub(crate) inner: Arc<CacheInner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                store: Mutex::new(Store::default()),
                config,
            }),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.inner.config
    }

    /// Return the last known value for `key` immediately.
    ///
    /// When the value is missing, stale or invalidated and nothing is in
    /// flight, exactly one background fetch is started with `fetcher`. The
    /// fetcher is remembered so invalidation can refetch observed keys.
    pub fn read<T, F, Fut, E>(&self, key: &QueryKey, fetcher: F) -> Result<Snapshot<T>, CacheError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let fetcher = erase(fetcher);
        let stale_time = self.inner.config.stale_time;
        let now = Instant::now();

        let mut store = self.inner.lock();
        let entry = store.entry(key, now);
        entry.fetcher = Some(Arc::clone(&fetcher));
        entry.last_used = now;

        if entry.needs_fetch(now, stale_time) {
            self.inner.start_fetch(&mut store, key, fetcher)?;
        }

        store
            .entries
            .get(key)
            .ok_or_else(|| CacheError::Removed { key: key.clone() })?
            .snapshot(key, now, stale_time)
    }

    /// Resolve to a fresh value for `key`.
    ///
    /// Joins the in-flight fetch when there is one, returns the cached value
    /// when it is fresh, and otherwise starts a single fetch and awaits it.
    /// A value from a fetch that an invalidation overtook is not returned;
    /// the newer fetch is joined, or started, and awaited instead.
    pub async fn fetch<T, F, Fut, E>(&self, key: &QueryKey, fetcher: F) -> Result<Arc<T>, CacheError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let fetcher = erase(fetcher);
        let (mut pending, mut started) = {
            let stale_time = self.inner.config.stale_time;
            let now = Instant::now();

            let mut store = self.inner.lock();
            let entry = store.entry(key, now);
            entry.fetcher = Some(Arc::clone(&fetcher));
            entry.last_used = now;

            if let Some(in_flight) = &entry.in_flight {
                (in_flight.future.clone(), in_flight.started_epoch)
            } else if entry.freshness(now, stale_time) == Freshness::Fresh
                && let Some(value) = entry.value.clone()
            {
                return downcast(key, value);
            } else {
                let future = self.inner.start_fetch(&mut store, key, Arc::clone(&fetcher))?;
                (future, store.epoch)
            }
        };

        loop {
            let payload = pending.await.map_err(|error| CacheError::Fetch {
                key: key.clone(),
                error,
            })?;

            let mut store = self.inner.lock();
            let Some(entry) = store.entries.get(key) else {
                return downcast(key, payload);
            };
            if !entry.invalidated_epoch.is_some_and(|epoch| epoch > started) {
                return downcast(key, payload);
            }
            match &entry.in_flight {
                Some(in_flight) if in_flight.started_epoch > started => {
                    pending = in_flight.future.clone();
                    started = in_flight.started_epoch;
                }
                Some(_) => return downcast(key, payload),
                None => {
                    tracing::debug!(%key, "fetch overtaken by invalidation, refetching");
                    pending = self.inner.start_fetch(&mut store, key, Arc::clone(&fetcher))?;
                    started = store.epoch;
                }
            }
        }
    }

    /// Peek at an entry without starting anything.
    pub fn get<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
    ) -> Result<Option<Snapshot<T>>, CacheError> {
        self.inner.snapshot(key)
    }

    /// Seed `key` with a known-good value, fresh as of now.
    ///
    /// Used with server-computed data so the first read does not fetch the
    /// same thing again.
    pub fn hydrate<T: Send + Sync + 'static>(&self, key: &QueryKey, value: T) {
        let now = Instant::now();
        let mut store = self.inner.lock();
        let entry = store.entry(key, now);
        entry.value = Some(Arc::new(value));
        entry.updated_at = Some(now);
        entry.invalidated_epoch = None;
        entry.error = None;
        entry.last_used = now;
        entry.notify();
        tracing::debug!(%key, "cache entry hydrated");
    }

    /// Mark every entry under `prefix` stale. Returns the number of entries
    /// touched.
    ///
    /// Observed entries are refetched right away. An entry with a fetch in
    /// flight gets exactly one follow-up fetch when that fetch completes,
    /// however many invalidations arrive meanwhile.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut store = self.inner.lock();
        let epoch = store.tick();

        let mut refetch = Vec::new();
        let mut touched = 0;
        for (key, entry) in store
            .entries
            .iter_mut()
            .filter(|(key, _)| key.starts_with(prefix))
        {
            touched += 1;
            entry.invalidated_epoch = Some(epoch);
            if entry.observers > 0 {
                if entry.in_flight.is_some() {
                    entry.follow_up = true;
                } else if let Some(fetcher) = entry.fetcher.clone() {
                    refetch.push((key.clone(), fetcher));
                }
            }
            entry.notify();
        }

        for (key, fetcher) in refetch {
            if let Err(e) = self.inner.start_fetch(&mut store, &key, fetcher) {
                tracing::warn!(%key, "refetch after invalidation not started: {e}");
            }
        }

        tracing::debug!(%prefix, touched, "cache invalidated");
        touched
    }

    /// Register an active observer for `key`. The observer count drops when
    /// the returned handle is dropped.
    pub fn observe<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Observer<T> {
        let mut store = self.inner.lock();
        let entry = store.entry(key, Instant::now());
        entry.observers += 1;
        let entry_id = entry.id;
        let rx = entry.version.subscribe();
        drop(store);

        Observer::new(self.clone(), key.clone(), entry_id, rx)
    }

    /// Drop every entry under `prefix`, in-flight fetches included (their
    /// results are discarded). Returns the number removed.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let mut store = self.inner.lock();
        let before = store.entries.len();
        store.entries.retain(|key, _| !key.starts_with(prefix));
        before - store.entries.len()
    }

    /// Drop unobserved entries that have been idle for at least the gc time.
    pub fn collect_garbage(&self) -> usize {
        let gc_time = self.inner.config.gc_time;
        let now = Instant::now();
        let mut store = self.inner.lock();
        let before = store.entries.len();
        store.entries.retain(|_, entry| {
            entry.observers > 0
                || entry.in_flight.is_some()
                || now.saturating_duration_since(entry.last_used) < gc_time
        });
        let removed = before - store.entries.len();
        if removed > 0 {
            tracing::debug!(removed, "cache garbage collected");
        }
        removed
    }

    /// Run [`QueryCache::collect_garbage`] every `every` until the cache is
    /// dropped or the task is aborted.
    pub fn spawn_gc(&self, every: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                QueryCache { inner }.collect_garbage();
            }
        })
    }

    pub fn stats(&self) -> CacheStats {
        let store = self.inner.lock();
        CacheStats {
            entries: store.entries.len(),
            in_flight: store
                .entries
                .values()
                .filter(|entry| entry.in_flight.is_some())
                .count(),
            fetches_started: store.fetches_started,
        }
    }
}
