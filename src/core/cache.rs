use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How long a fetched value is served before it is fetched again.
pub const DEFAULT_TTL: Duration = Duration::from_secs(120);

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Memoizes an async fetch by the serialized form of its key.
///
/// Entries are valid while `now - stored_at < ttl`. Stale entries are only
/// replaced when the key is fetched again; nothing is evicted.
///
/// The lock is released while `fetch` runs, so two overlapping calls for
/// the same absent or stale key both invoke `fetch` and the last one to
/// finish wins.
#[derive(Clone)]
pub struct TtlCache<V> {
    ttl: Duration,
    inner: Arc<Mutex<HashMap<String, CacheEntry<V>>>>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key`, or runs `fetch` and stores its
    /// result. Errors from `fetch` are returned as-is and never cached.
    pub async fn get_or_fetch<K, F, Fut, E>(&self, key: &K, fetch: F) -> Result<V, E>
    where
        K: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let Ok(cache_key) = serde_json::to_string(key) else {
            warn!("Cache key is not serializable, bypassing cache");
            return fetch().await;
        };

        if let Some(value) = self.get_fresh(&cache_key).await {
            debug!(key = %cache_key, "Cache HIT");
            return Ok(value);
        }
        debug!(key = %cache_key, "Cache MISS");

        let value = fetch().await?;

        let mut cache = self.inner.lock().await;
        debug!(key = %cache_key, "Cache PUT");
        cache.insert(
            cache_key,
            CacheEntry {
                value: value.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(value)
    }

    async fn get_fresh(&self, cache_key: &str) -> Option<V> {
        let cache = self.inner.lock().await;
        cache
            .get(cache_key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Number of stored entries, including stale ones.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted_fetch(calls: &AtomicUsize, value: i32) -> Result<i32> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_within_ttl() {
        let cache = TtlCache::<i32>::default();
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_fetch("bitcoin", || counted_fetch(&calls, 1))
            .await
            .unwrap();
        assert_eq!(first, 1);

        tokio::time::advance(Duration::from_millis(119_999)).await;

        // Fetch would return a different value, but must not run
        let second = cache
            .get_or_fetch("bitcoin", || counted_fetch(&calls, 2))
            .await
            .unwrap();
        assert_eq!(second, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_refetches_after_ttl() {
        let cache = TtlCache::<i32>::default();
        let calls = AtomicUsize::new(0);

        cache
            .get_or_fetch("bitcoin", || counted_fetch(&calls, 1))
            .await
            .unwrap();
        cache
            .get_or_fetch("bitcoin", || counted_fetch(&calls, 1))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(120_000)).await;

        let third = cache
            .get_or_fetch("bitcoin", || counted_fetch(&calls, 3))
            .await
            .unwrap();
        assert_eq!(third, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // Overwritten in place
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let cache = TtlCache::<i32>::default();
        let calls = AtomicUsize::new(0);

        cache
            .get_or_fetch("bitcoin", || counted_fetch(&calls, 1))
            .await
            .unwrap();
        cache
            .get_or_fetch("ethereum", || counted_fetch(&calls, 2))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = TtlCache::<i32>::default();
        let calls = AtomicUsize::new(0);

        let result = cache
            .get_or_fetch("bitcoin", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(anyhow!("boom"))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty().await);

        let value = cache
            .get_or_fetch("bitcoin", || counted_fetch(&calls, 7))
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_both_fetch() {
        let cache = TtlCache::<i32>::default();
        let calls = AtomicUsize::new(0);

        let slow_fetch = |value| {
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok::<_, anyhow::Error>(value)
            }
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch("bitcoin", || slow_fetch(1)),
            cache.get_or_fetch("bitcoin", || slow_fetch(2)),
        );
        assert!(a.is_ok() && b.is_ok());

        // No in-flight de-duplication
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 1);
    }
}
