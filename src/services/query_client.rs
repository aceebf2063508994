//! Shared query cache with single-flight fetching.
//!
//! One [`QueryClient`] is shared by the shell and every remote. Values are
//! addressed by [`QueryKey`]; while a fetch for a key is running, every other
//! caller for that key joins it instead of starting a second one. Fetches run
//! on their own task so they complete, and populate the cache, even when the
//! caller that started them goes away.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;

use crate::domain::errors::QueryError;
use crate::domain::models::config::CacheConfig;
use crate::domain::models::{QueryKey, QueryOptions, QuerySnapshot, QueryStatus};

/// Freshness window applied when neither the client nor the query sets one.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(60);

type CachedValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<CachedValue, QueryError>>>;

struct Entry {
    status: QueryStatus,
    value: Option<CachedValue>,
    error: Option<QueryError>,
    updated_at: Option<DateTime<Utc>>,
    fetched_at: Option<Instant>,
    stale_time: Duration,
    invalidated: bool,
    in_flight: Option<(u64, SharedFetch)>,
}

impl Entry {
    const fn new(stale_time: Duration) -> Self {
        Self {
            status: QueryStatus::Pending,
            value: None,
            error: None,
            updated_at: None,
            fetched_at: None,
            stale_time,
            invalidated: false,
            in_flight: None,
        }
    }

    /// Only successful, non-invalidated values inside their window are fresh.
    fn is_fresh(&self, now: Instant) -> bool {
        self.status == QueryStatus::Success
            && !self.invalidated
            && self
                .fetched_at
                .is_some_and(|at| now.duration_since(at) < self.stale_time)
    }

    fn snapshot(&self, key: &QueryKey, now: Instant) -> QuerySnapshot {
        QuerySnapshot {
            key: key.clone(),
            status: self.status,
            last_updated_at: self.updated_at,
            is_stale: !self.is_fresh(now),
            is_fetching: self.in_flight.is_some(),
            error: self.error.as_ref().map(ToString::to_string),
        }
    }
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    next_fetch_id: AtomicU64,
    default_stale_time: Duration,
}

impl Inner {
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a fetch outcome if `fetch_id` is still the entry's current fetch.
    fn complete(&self, key: &QueryKey, fetch_id: u64, result: &Result<CachedValue, QueryError>) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            tracing::debug!(key = %key, "discarding result for removed query");
            return;
        };
        if entry.in_flight.as_ref().map(|(id, _)| *id) != Some(fetch_id) {
            tracing::debug!(key = %key, "discarding superseded fetch result");
            return;
        }
        entry.in_flight = None;

        match result {
            Ok(value) => {
                entry.status = QueryStatus::Success;
                entry.value = Some(Arc::clone(value));
                entry.error = None;
                entry.updated_at = Some(Utc::now());
                entry.fetched_at = Some(Instant::now());
                tracing::debug!(key = %key, "query succeeded");
            }
            Err(err) => {
                entry.status = QueryStatus::Error;
                entry.error = Some(err.clone());
                entry.updated_at = Some(Utc::now());
                tracing::warn!(key = %key, error = %err, "query failed");
            }
        }
    }
}

/// Process-wide query cache.
///
/// Cloning is cheap; clones share the same cache.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME)
    }
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.inner.entries().keys().map(ToString::to_string).collect();
        keys.sort();
        f.debug_struct("QueryClient")
            .field("default_stale_time", &self.inner.default_stale_time)
            .field("keys", &keys)
            .finish()
    }
}

impl QueryClient {
    /// Empty cache with the given default freshness window.
    pub fn new(default_stale_time: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                next_fetch_id: AtomicU64::new(1),
                default_stale_time,
            }),
        }
    }

    /// Cache using the configured stale time.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.stale_time())
    }

    /// Freshness window used when a fetch passes no options.
    pub fn default_stale_time(&self) -> Duration {
        self.inner.default_stale_time
    }

    /// Fetch `key` with the client's default freshness window.
    ///
    /// See [`fetch_with`](Self::fetch_with).
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, producer: F) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        self.fetch_with(key, QueryOptions::default(), producer).await
    }

    /// Return the cached value for `key`, running `producer` when needed.
    ///
    /// - A fresh value is returned without calling `producer`.
    /// - If a fetch for `key` is already running, this call joins it.
    /// - Otherwise `producer` runs on a new task and its outcome is cached.
    ///
    /// Errors are cached too but never count as fresh, so the next call
    /// after a failure fetches again.
    pub async fn fetch_with<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        producer: F,
    ) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let fetch = {
            let mut entries = self.inner.entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(self.inner.default_stale_time));
            if let Some(stale_time) = options.stale_time {
                entry.stale_time = stale_time;
            }

            if let Some((_, in_flight)) = &entry.in_flight {
                tracing::debug!(key = %key, "joining in-flight query");
                in_flight.clone()
            } else if entry.is_fresh(Instant::now()) {
                tracing::trace!(key = %key, "query cache hit");
                let cached = entry.value.clone();
                drop(entries);
                return match cached {
                    Some(value) => downcast(value, &key),
                    None => Err(QueryError::TypeMismatch {
                        key: key.to_string(),
                    }),
                };
            } else {
                let fetch_id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                let shared = self.spawn_fetch(key.clone(), fetch_id, producer);
                entry.in_flight = Some((fetch_id, shared.clone()));
                entry.invalidated = false;
                tracing::debug!(key = %key, fetch_id, "starting query");
                shared
            }
        };

        let value = fetch.await?;
        downcast(value, &key)
    }

    fn spawn_fetch<T, F, Fut>(&self, key: QueryKey, fetch_id: u64, producer: F) -> SharedFetch
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            let result = producer().await.map(|value| Arc::new(value) as CachedValue);
            inner.complete(&task_key, fetch_id, &result);
            result
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(join_err) => Err(QueryError::Aborted {
                    key: key.to_string(),
                    reason: join_err.to_string(),
                }),
            }
        }
        .boxed()
        .shared()
    }

    /// Warm the cache for `key`; failures are logged and cached, not returned.
    pub async fn prefetch<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, producer: F)
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let key_str = key.to_string();
        if let Err(err) = self.fetch_with::<T, F, Fut>(key, options, producer).await {
            tracing::warn!(key = %key_str, error = %err, "prefetch failed");
        }
    }

    /// Diagnostic state of one entry.
    pub fn get(&self, key: &QueryKey) -> Option<QuerySnapshot> {
        let now = Instant::now();
        self.inner.entries().get(key).map(|e| e.snapshot(key, now))
    }

    /// Last successful value for `key`, fresh or stale.
    ///
    /// Returns `None` if there is no value or it has a different type.
    pub fn get_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let value = self.inner.entries().get(key)?.value.clone()?;
        value.downcast::<T>().ok()
    }

    /// Last error for `key` while the entry is in the error state.
    pub fn get_error(&self, key: &QueryKey) -> Option<QueryError> {
        self.inner.entries().get(key)?.error.clone()
    }

    /// Whether a producer is running for `key`.
    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner
            .entries()
            .get(key)
            .is_some_and(|e| e.in_flight.is_some())
    }

    /// Store a value directly, as if a fetch had just succeeded.
    ///
    /// A fetch running for `key` is superseded: its callers still receive
    /// its outcome, but it no longer writes to the cache.
    pub fn set<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        let mut entries = self.inner.entries();
        let entry = entries
            .entry(key)
            .or_insert_with(|| Entry::new(self.inner.default_stale_time));
        entry.status = QueryStatus::Success;
        entry.value = Some(Arc::new(value));
        entry.error = None;
        entry.updated_at = Some(Utc::now());
        entry.fetched_at = Some(Instant::now());
        entry.invalidated = false;
        entry.in_flight = None;
    }

    /// Mark `key` stale so the next fetch runs the producer.
    ///
    /// The cached value stays readable. Returns whether the key existed.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        let found = self.inner.entries().get_mut(key).map(|entry| {
            entry.invalidated = true;
        });
        if found.is_some() {
            tracing::debug!(key = %key, "query invalidated");
        }
        found.is_some()
    }

    /// Invalidate every key starting with `prefix`. Returns the count.
    pub fn invalidate_matching(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.inner.entries();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                count += 1;
            }
        }
        tracing::debug!(prefix = %prefix, count, "queries invalidated");
        count
    }

    /// Mark every entry stale. Returns the number of entries.
    pub fn invalidate_all(&self) -> usize {
        let mut entries = self.inner.entries();
        for entry in entries.values_mut() {
            entry.invalidated = true;
        }
        entries.len()
    }

    /// Drop the entry for `key`.
    ///
    /// A fetch still running for it completes for its callers but its result
    /// is discarded.
    pub fn remove(&self, key: &QueryKey) -> bool {
        self.inner.entries().remove(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.entries().clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.entries().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.entries().is_empty()
    }

    /// State of every entry, sorted by key.
    pub fn snapshot(&self) -> Vec<QuerySnapshot> {
        let now = Instant::now();
        let mut snapshots: Vec<QuerySnapshot> = self
            .inner
            .entries()
            .iter()
            .map(|(key, entry)| entry.snapshot(key, now))
            .collect();
        snapshots.sort_by(|a, b| a.key.cmp(&b.key));
        snapshots
    }
}

fn downcast<T: Send + Sync + 'static>(value: CachedValue, key: &QueryKey) -> Result<Arc<T>, QueryError> {
    value.downcast::<T>().map_err(|_| QueryError::TypeMismatch {
        key: key.to_string(),
    })
}
