//! Time-bounded get-or-compute cache.
//!
//! One instance is created at startup for each cached read path (currently
//! leaderboards) and lives as long as the process. Nothing is persisted.
//! Expiry is judged against an injected [`Clock`].
//!
//! Concurrent misses on the same key may each run `compute`; the last
//! result wins. Every miss sweeps out expired entries, so the map never
//! holds more than the keys requested within one time to live.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::clock::Clock;

/// A cached value and the instant it stops being served.
#[derive(Debug, Clone)]
struct CachedEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Keyed cache whose entries expire after a per-call time to live.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<K, CachedEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the live entry for `key`, or run `compute`, store its result
    /// for `ttl`, and return it. Errors from `compute` are not cached.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, ttl: Duration, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let now = self.clock.now();
        {
            let entries = self.entries.lock().await;
            if let Some(entry) = entries.get(&key).filter(|entry| entry.expires_at > now) {
                tracing::debug!("cache hit");
                return Ok(entry.value.clone());
            }
        }

        tracing::debug!("cache miss");
        let value = compute().await?;
        let expires_at = now.checked_add_signed(ttl).unwrap_or(now);
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key,
            CachedEntry {
                value: value.clone(),
                expires_at,
            },
        );
        Ok(value)
    }

    /// Number of entries held, live or not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::TimeZone;

    use super::*;
    use crate::clock::ManualClock;

    fn setup() -> (Arc<ManualClock>, TtlCache<String, u32>) {
        let start = Utc
            .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .unwrap_or_default();
        let clock = Arc::new(ManualClock::new(start));
        let cache = TtlCache::new(Arc::clone(&clock) as Arc<dyn Clock>);
        (clock, cache)
    }

    #[tokio::test]
    async fn serves_cached_value_until_expiry() {
        let (clock, cache) = setup();
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let ttl = Duration::seconds(300);
        let compute = move || async move {
            Ok::<_, ()>(calls.fetch_add(1, Ordering::SeqCst).saturating_add(1))
        };

        assert_eq!(cache.get_or_compute("k".to_owned(), ttl, compute).await, Ok(1));
        clock.advance(Duration::seconds(299));
        assert_eq!(cache.get_or_compute("k".to_owned(), ttl, compute).await, Ok(1));
        clock.advance(Duration::seconds(1));
        assert_eq!(cache.get_or_compute("k".to_owned(), ttl, compute).await, Ok(2));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let (_clock, cache) = setup();
        let ttl = Duration::seconds(60);
        let a = cache.get_or_compute("a".to_owned(), ttl, || async { Ok::<_, ()>(1) }).await;
        let b = cache.get_or_compute("b".to_owned(), ttl, || async { Ok::<_, ()>(2) }).await;
        assert_eq!((a, b), (Ok(1), Ok(2)));
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let (_clock, cache) = setup();
        let ttl = Duration::seconds(60);
        let failed = cache
            .get_or_compute("k".to_owned(), ttl, || async { Err::<u32, _>("boom") })
            .await;
        assert_eq!(failed, Err("boom"));
        let ok = cache.get_or_compute("k".to_owned(), ttl, || async { Ok::<_, &str>(7) }).await;
        assert_eq!(ok, Ok(7));
    }

    #[tokio::test]
    async fn misses_sweep_out_expired_keys() {
        let (clock, cache) = setup();
        assert!(cache.is_empty().await);
        let ttl = Duration::seconds(1);
        for offset in 0..1000_u32 {
            let _ = cache
                .get_or_compute(format!("wealth-10-{offset}"), ttl, || async { Ok::<_, ()>(offset) })
                .await;
        }
        assert_eq!(cache.len().await, 1000);

        clock.advance(Duration::hours(1));
        let fresh = cache
            .get_or_compute("wealth-10-0".to_owned(), ttl, || async { Ok::<_, ()>(42) })
            .await;
        assert_eq!(fresh, Ok(42));
        assert_eq!(cache.len().await, 1);
    }
}
