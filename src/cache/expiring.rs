use moka::sync::Cache;
use moka::Expiry;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Longest lifetime any single entry is granted.
pub const MAX_ENTRY_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Expiry policy reading each entry's own time-to-live.
struct PerEntryTtl;

impl<K, V> Expiry<K, (V, Duration)> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &K,
        value: &(V, Duration),
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.1)
    }

    fn expire_after_update(
        &self,
        _key: &K,
        value: &(V, Duration),
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.1)
    }
}

/// Concurrent map whose entries carry their own time-to-live.
///
/// Backs the token→user and participation caches. Expired entries are
/// invisible to `get` and reclaimed by `evict_expired`.
pub struct ExpiringCache<K, V> {
    entries: Cache<K, (V, Duration)>,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        ExpiringCache {
            entries: Cache::builder().expire_after(PerEntryTtl).build(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|(value, _)| value)
    }

    /// Insert or replace an entry; `ttl` is capped at `MAX_ENTRY_TTL`.
    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        self.entries.insert(key, (value, ttl.min(MAX_ENTRY_TTL)));
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(value, _)| value)
    }

    /// Reclaim expired entries; returns roughly how many went away.
    pub fn evict_expired(&self) -> usize {
        let before = self.entries.entry_count();
        self.entries.run_pending_tasks();
        before.saturating_sub(self.entries.entry_count()) as usize
    }

    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for ExpiringCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        ExpiringCache::new()
    }
}
