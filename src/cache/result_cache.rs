//! TTL cache of search responses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::cache::config::CacheConfig;
use crate::cache::fingerprint::Fingerprint;
use crate::search::response::SearchResponse;
use crate::util::clock::SharedClock;

/// A cached response.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub response: SearchResponse,
    pub inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now.signed_duration_since(self.inserted_at) < ttl
    }

    /// Structural checks on a stored response. An entry failing them is
    /// treated as a miss and dropped.
    fn is_consistent(&self, key: &Fingerprint) -> bool {
        let response = &self.response;
        &self.fingerprint == key
            && response.results.len() <= response.limit
            && response.results.len() <= response.total
            && response.page >= 1
    }
}

/// Cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Entries removed because they expired, were inconsistent, or made room.
    pub evictions: u64,
}

/// Thread-safe TTL cache keyed by request fingerprint.
#[derive(Debug)]
pub struct ResultCache {
    config: CacheConfig,
    ttl: TimeDelta,
    clock: SharedClock,
    entries: RwLock<HashMap<Fingerprint, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ResultCache {
    pub fn new(config: CacheConfig, clock: SharedClock) -> Self {
        let ttl = TimeDelta::from_std(config.ttl).unwrap_or(TimeDelta::MAX);
        Self {
            config,
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a fresh response. Expired or inconsistent entries are evicted
    /// and reported as a miss.
    pub fn get(&self, key: &Fingerprint) -> Option<SearchResponse> {
        if !self.config.enabled {
            return None;
        }

        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    log::trace!("cache miss for {key}");
                    return None;
                }
                Some(entry) if entry.is_fresh(now, self.ttl) && entry.is_consistent(key) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    log::trace!("cache hit for {key}");
                    return Some(entry.response.clone());
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock: another caller may have replaced
        // the entry in between.
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(key) {
            if entry.is_fresh(now, self.ttl) && entry.is_consistent(key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.response.clone());
            }
            if !entry.is_consistent(key) {
                log::warn!("dropping inconsistent cache entry for {key}");
            }
            entries.remove(key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert or overwrite the response for `key`.
    pub fn store(&self, key: Fingerprint, response: SearchResponse) {
        if !self.config.enabled {
            return;
        }

        let now = self.clock.now();
        let mut entries = self.entries.write();

        let at_capacity = self
            .config
            .max_entries
            .filter(|&max| !entries.contains_key(&key) && entries.len() >= max);
        if let Some(max) = at_capacity {
            let before = entries.len();
            entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
            let mut evicted = before - entries.len();

            if entries.len() >= max {
                let oldest = entries
                    .values()
                    .min_by_key(|entry| entry.inserted_at)
                    .map(|entry| entry.fingerprint.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                    evicted += 1;
                }
            }
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        }

        if max_is_zero(self.config.max_entries) {
            return;
        }

        entries.insert(
            key.clone(),
            CacheEntry {
                fingerprint: key,
                response,
                inserted_at: now,
            },
        );
    }

    /// Remove every expired entry, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
        let removed = before - entries.len();

        if removed > 0 {
            self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
            log::debug!("cache sweep removed {removed} expired entries");
        }
        removed
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
        log::debug!("result cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

fn max_is_zero(max_entries: Option<usize>) -> bool {
    max_entries == Some(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::filter::SearchFilters;
    use crate::search::ranking::SortStrategy;
    use crate::util::clock::ManualClock;
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::time::Duration;

    fn key(q: &str) -> Fingerprint {
        use crate::query::normalizer::QueryNormalizer;
        use crate::search::SearchConfig;
        use crate::search::request::{SearchParams, SearchRequest};
        Fingerprint::of(&SearchRequest::prepare(
            SearchParams::new(q),
            &QueryNormalizer::default(),
            &SearchConfig::default(),
        ))
    }

    fn response(q: &str) -> SearchResponse {
        SearchResponse::empty(q, SearchFilters::new(), SortStrategy::Relevance, 1, 10)
    }

    fn cache_with(config: CacheConfig) -> (ResultCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        (ResultCache::new(config, clock.clone()), clock)
    }

    #[test]
    fn test_store_and_get() {
        let (cache, _) = cache_with(CacheConfig::default());
        assert!(cache.get(&key("economy")).is_none());

        cache.store(key("economy"), response("economy"));
        let hit = cache.get(&key("economy")).unwrap();
        assert_eq!(hit.query, "economy");

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_ttl_boundaries() {
        let (cache, clock) = cache_with(CacheConfig::default().with_ttl(Duration::from_secs(300)));
        cache.store(key("economy"), response("economy"));

        clock.advance(TimeDelta::seconds(300) - TimeDelta::milliseconds(1));
        assert!(cache.get(&key("economy")).is_some());

        clock.advance(TimeDelta::milliseconds(2));
        assert!(cache.get(&key("economy")).is_none());
        // Expired entries are evicted on access.
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let (cache, clock) = cache_with(CacheConfig::default().with_ttl(Duration::from_secs(60)));
        cache.store(key("old query"), response("old query"));
        clock.advance(TimeDelta::seconds(45));
        cache.store(key("new query"), response("new query"));
        clock.advance(TimeDelta::seconds(30));

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("new query")).is_some());
    }

    #[test]
    fn test_clear() {
        let (cache, _) = cache_with(CacheConfig::default());
        cache.store(key("a query"), response("a query"));
        cache.store(key("b query"), response("b query"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_inconsistent_entry_is_a_miss() {
        let (cache, _) = cache_with(CacheConfig::default());
        let mut bad = response("economy");
        bad.results = vec![
            crate::document::ResultItem::builder("1", "one").build(),
        ];
        bad.total = 0;
        cache.store(key("economy"), bad);

        assert!(cache.get(&key("economy")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let (cache, clock) = cache_with(CacheConfig::default().with_max_entries(Some(2)));
        cache.store(key("first"), response("first"));
        clock.advance(TimeDelta::seconds(1));
        cache.store(key("second"), response("second"));
        clock.advance(TimeDelta::seconds(1));
        cache.store(key("third"), response("third"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("first")).is_none());
        assert!(cache.get(&key("second")).is_some());
        assert!(cache.get(&key("third")).is_some());
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let (cache, _) = cache_with(CacheConfig::disabled());
        cache.store(key("economy"), response("economy"));
        assert!(cache.get(&key("economy")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let (cache, _) = cache_with(CacheConfig::default().with_max_entries(None));
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let q = format!("query {t} {i}");
                        cache.store(key(&q), response(&q));
                        assert!(cache.get(&key(&q)).is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 400);
    }
}
