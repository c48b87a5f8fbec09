use async_trait::async_trait;
use std::time::Duration;

/// Key/value store with per-entry expiry.
///
/// An entry is visible iff it has not yet expired; expired entries behave
/// exactly like absent ones. `put` overwrites unconditionally.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;

    async fn put(&self, key: K, value: V, ttl: Duration);

    /// Drops every expired entry, returning how many were removed.
    async fn purge_expired(&self) -> usize;

    /// Number of stored entries, expired or not.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
