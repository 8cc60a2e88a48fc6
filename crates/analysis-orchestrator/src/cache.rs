use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Per-symbol cache with a time-to-live and a capacity bound.
///
/// Expired entries are dropped on read and before every insert; when the
/// cache is still full the oldest entry is evicted.
pub struct TtlCache<T: Clone> {
    entries: DashMap<String, CacheEntry<T>>,
    ttl: Duration,
    max_entries: usize,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    fn is_expired(&self, cached_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - cached_at >= self.ttl
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let now = Utc::now();
        if let Some(entry) = self.entries.get(key) {
            if !self.is_expired(entry.cached_at, now) {
                return Some(entry.data.clone());
            }
        }
        self.entries
            .remove_if(key, |_, entry| self.is_expired(entry.cached_at, now));
        None
    }

    pub fn insert(&self, key: String, data: T) {
        let now = Utc::now();
        self.entries
            .retain(|_, entry| !self.is_expired(entry.cached_at, now));

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().cached_at)
                .map(|entry| entry.key().clone());
            if let Some(oldest) = oldest {
                tracing::debug!("Cache full, evicting {}", oldest);
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(key, CacheEntry { data, cached_at: now });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
