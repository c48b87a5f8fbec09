use crate::core::cache::Cache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct CacheValue<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheValue<V> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory cache with lazy TTL expiry and an optional capacity bound.
///
/// Lookups never remove anything; expired entries are only dropped when a
/// `put` needs room or on an explicit [`Cache::purge_expired`].
pub struct MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, CacheValue<V>>>>,
    max_entries: Option<usize>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Creates an unbounded MemoryCache
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max_entries: None,
        }
    }

    /// Creates a MemoryCache holding at most `max_entries` keys
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::with_capacity(max_entries))),
            max_entries: Some(max_entries.max(1)),
        }
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

fn purge<K, V>(cache: &mut HashMap<K, CacheValue<V>>, now: Instant) -> usize {
    let before = cache.len();
    cache.retain(|_, entry| entry.is_live(now));
    before - cache.len()
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => {
                debug!("Cache HIT for key: {:?}", key);
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache entry expired for key: {:?}", key);
                None
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
        }
    }

    async fn put(&self, key: K, value: V, ttl: Duration) {
        let now = Instant::now();
        let cache_value = CacheValue {
            value,
            expires_at: now + ttl,
        };

        let mut cache = self.inner.lock().await;
        if let Some(max) = self.max_entries
            && !cache.contains_key(&key)
            && cache.len() >= max
        {
            let purged = purge(&mut *cache, now);
            if cache.len() >= max {
                // Still full of live entries: drop whichever expires soonest.
                let victim = cache
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(victim) = victim {
                    debug!("Cache EVICT for key: {:?}", victim);
                    cache.remove(&victim);
                }
            } else {
                debug!("Cache purged {} expired entries", purged);
            }
        }
        debug!("Cache PUT for key: {:?} (ttl {:?})", key, ttl);
        cache.insert(key, cache_value);
    }

    async fn purge_expired(&self) -> usize {
        let mut cache = self.inner.lock().await;
        purge(&mut *cache, Instant::now())
    }

    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
