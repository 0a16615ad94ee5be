//! Process-wide memoization with a time-to-live.
//!
//! Entries are keyed by the name of the memoized function plus its
//! arguments. Expired entries are evicted lazily when they are read.

use std::{collections::HashMap, time::Duration};

use tokio::{sync::Mutex, time::Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub function: &'static str,
    pub args: String,
}

impl CacheKey {
    pub fn new(function: &'static str, args: impl Into<String>) -> Self {
        Self { function, args: args.into() }
    }
}

#[derive(Debug)]
struct StoredEntry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, StoredEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a fresh value, or `None` for misses and expired entries.
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => {
                tracing::debug!(function = key.function, args = %key.args, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                tracing::debug!(function = key.function, args = %key.args, "cache entry expired");
                entries.remove(key);
                None
            }
            None => {
                tracing::debug!(function = key.function, args = %key.args, "cache miss");
                None
            }
        }
    }

    pub async fn put(&self, key: CacheKey, value: V) {
        let expires_at = Instant::now() + self.ttl;
        self.entries.lock().await.insert(key, StoredEntry { value, expires_at });
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn value_is_fresh_until_ttl_elapses() {
        let cache = TtlCache::new(Duration::from_secs(600));
        let key = CacheKey::new("city_snapshot", "Delhi");

        cache.put(key.clone(), 42).await;
        assert_eq!(cache.get(&key).await, Some(42));

        tokio::time::advance(Duration::from_secs(599)).await;
        assert_eq!(cache.get(&key).await, Some(42));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get(&key).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_evicted_on_read() {
        let cache = TtlCache::new(Duration::from_secs(10));
        let key = CacheKey::new("daily_forecast", "19.0,72.8");

        cache.put(key.clone(), "x".to_string()).await;
        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.get(&key).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn keys_differ_by_function_and_args() {
        let cache = TtlCache::new(Duration::from_secs(60));

        cache.put(CacheKey::new("city_snapshot", "Pune"), 1).await;
        cache.put(CacheKey::new("daily_forecast", "Pune"), 2).await;

        assert_eq!(cache.get(&CacheKey::new("city_snapshot", "Pune")).await, Some(1));
        assert_eq!(cache.get(&CacheKey::new("daily_forecast", "Pune")).await, Some(2));
        assert_eq!(cache.get(&CacheKey::new("city_snapshot", "Goa")).await, None);
    }
}
