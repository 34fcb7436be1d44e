//! Keyed stale-while-revalidate cache with in-flight de-duplication.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use pawmatch_core::Result;
use tokio::time::Instant;

pub type SharedFetch<V> = Shared<BoxFuture<'static, Result<V>>>;

/// Idle entries are dropped once they are this many stale windows old.
const GC_MULTIPLE: u32 = 3;

struct InFlight<V> {
    id: u64,
    future: SharedFetch<V>,
}

struct Entry<V> {
    value: Option<V>,
    fetched_at: Option<Instant>,
    in_flight: Option<InFlight<V>>,
}

impl<V> Entry<V> {
    /// No request running and nothing read it within `gc_after`.
    fn is_collectable(&self, gc_after: Duration) -> bool {
        self.in_flight.is_none() && self.fetched_at.is_none_or(|at| at.elapsed() >= gc_after)
    }
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            value: None,
            fetched_at: None,
            in_flight: None,
        }
    }
}

type Entries<K, V> = Arc<Mutex<HashMap<K, Entry<V>>>>;

enum Plan<V> {
    /// Cached value, possibly stale (a refetch may already be running)
    Cached(V),
    /// Nothing cached yet; wait for the shared request
    Join(SharedFetch<V>),
}

/// Cache of async query results keyed by value equality.
///
/// - Fresh entries are returned without calling the fetcher.
/// - Stale entries are returned immediately while one background refetch
///   replaces them.
/// - Concurrent readers of a missing entry share one request.
///
/// Errors are never cached: a failed initial fetch leaves the entry empty,
/// and a failed refetch keeps the previous value.
///
/// Entries with no request running are evicted once their value is older
/// than the collection window (three stale windows unless overridden), or
/// at the next read if they never held a value.
pub struct QueryCache<K, V> {
    name: &'static str,
    stale_time: Duration,
    gc_time: Duration,
    entries: Entries<K, V>,
    next_fetch_id: AtomicU64,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates an empty cache; `name` only tags log lines.
    pub fn new(name: &'static str, stale_time: Duration) -> Self {
        Self {
            name,
            stale_time,
            gc_time: stale_time.saturating_mul(GC_MULTIPLE),
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_fetch_id: AtomicU64::new(0),
        }
    }

    /// Overrides how long an idle entry is kept; never shorter than the
    /// stale window.
    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time.max(self.stale_time);
        self
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Number of entries currently held, including ones awaiting eviction.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value for `key`, calling `fetcher` only when needed.
    ///
    /// Must run inside a tokio runtime: requests are driven by spawned tasks
    /// so they complete even if every reader goes away.
    pub async fn fetch<F, Fut>(&self, key: K, fetcher: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        match self.plan(key, fetcher) {
            Plan::Cached(value) => Ok(value),
            Plan::Join(future) => future.await,
        }
    }

    /// The cached value for `key`, fresh or stale, without fetching.
    pub fn peek(&self, key: &K) -> Option<V> {
        lock(&self.entries).get(key).and_then(|e| e.value.clone())
    }

    /// Whether a request for `key` is currently running.
    pub fn is_fetching(&self, key: &K) -> bool {
        lock(&self.entries)
            .get(key)
            .is_some_and(|e| e.in_flight.is_some())
    }

    /// The request currently running for `key`, if any.
    ///
    /// After a stale read this is the background refetch; awaiting it yields
    /// the value that replaced the stale one.
    pub fn pending(&self, key: &K) -> Option<SharedFetch<V>> {
        lock(&self.entries)
            .get(key)
            .and_then(|e| e.in_flight.as_ref())
            .map(|f| f.future.clone())
    }

    /// Drops the entry for `key`; the next read fetches from scratch.
    ///
    /// A request already running for `key` still resolves for its readers
    /// but no longer populates the cache.
    pub fn invalidate(&self, key: &K) {
        if lock(&self.entries).remove(key).is_some() {
            tracing::debug!("[QueryCache:{}] Invalidated {:?}", self.name, key);
        }
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
        tracing::debug!("[QueryCache:{}] Cleared", self.name);
    }

    fn plan<F, Fut>(&self, key: K, fetcher: F) -> Plan<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let mut entries = lock(&self.entries);
        self.collect_idle(&mut entries, &key);
        let entry = entries.entry(key.clone()).or_default();

        if let Some(value) = entry.value.clone() {
            let fresh = entry
                .fetched_at
                .is_some_and(|at| at.elapsed() < self.stale_time);

            if !fresh && entry.in_flight.is_none() {
                tracing::debug!("[QueryCache:{}] Stale {:?}, refetching", self.name, key);
                entry.in_flight = Some(self.start(key, fetcher()));
            }
            return Plan::Cached(value);
        }

        if let Some(in_flight) = &entry.in_flight {
            tracing::debug!("[QueryCache:{}] Joining request for {:?}", self.name, key);
            return Plan::Join(in_flight.future.clone());
        }

        tracing::debug!("[QueryCache:{}] Miss {:?}", self.name, key);
        let in_flight = self.start(key, fetcher());
        let future = in_flight.future.clone();
        entry.in_flight = Some(in_flight);
        Plan::Join(future)
    }

    fn collect_idle(&self, entries: &mut HashMap<K, Entry<V>>, reading: &K) {
        let before = entries.len();
        entries.retain(|key, entry| key == reading || !entry.is_collectable(self.gc_time));
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!("[QueryCache:{}] Evicted {} idle entries", self.name, evicted);
        }
    }

    /// Spawns the request; its completion writes back only if the entry
    /// still points at this request.
    fn start<Fut>(&self, key: K, request: Fut) -> InFlight<V>
    where
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        let entries = Arc::clone(&self.entries);
        let name = self.name;

        let future = async move {
            let result = request.await;

            let mut map = lock(&entries);
            if let Some(entry) = map.get_mut(&key)
                && entry.in_flight.as_ref().is_some_and(|f| f.id == id)
            {
                entry.in_flight = None;
                match &result {
                    Ok(value) => {
                        entry.value = Some(value.clone());
                        entry.fetched_at = Some(Instant::now());
                    }
                    Err(e) => {
                        tracing::debug!("[QueryCache:{}] Fetch for {:?} failed: {}", name, key, e);
                    }
                }
            }
            result
        }
        .boxed()
        .shared();

        tokio::spawn(future.clone());
        InFlight { id, future }
    }
}

fn lock<K, V>(entries: &Entries<K, V>) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
    // Guards are never held across an await, so a poisoned map is still consistent
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}
