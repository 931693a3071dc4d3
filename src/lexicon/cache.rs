// Match cache — memoized detection outcomes keyed by raw token.
//
// Entries are tagged with the generation they were computed in. Clearing
// bumps the generation, so a result computed against an older lexicon
// cannot land in the cache after a concurrent term addition.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use crate::models::DetectionResult;

#[derive(Debug, Clone)]
struct CacheEntry {
    generation: u64,
    result: DetectionResult,
}

/// Hit/miss counters and size of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache (0.0 when unused).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Concurrent token -> result map.
#[derive(Default)]
pub struct MatchCache {
    entries: DashMap<String, CacheEntry>,
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation. Read this before computing a result and pass it
    /// to [`MatchCache::insert`].
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn get(&self, key: &str) -> Option<DetectionResult> {
        let current = self.generation();
        let found = self
            .entries
            .get(key)
            .filter(|entry| entry.generation == current)
            .map(|entry| entry.result.clone());

        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Store `result` unless the cache was cleared since `generation` was read.
    pub fn insert(&self, key: &str, result: DetectionResult, generation: u64) {
        if generation != self.generation() {
            return;
        }
        self.entries
            .insert(key.to_string(), CacheEntry { generation, result });
    }

    /// Drop every entry and invalidate in-flight computations.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_after_insert() {
        let cache = MatchCache::new();
        let gen = cache.generation();
        cache.insert("idiot", DetectionResult::matched(0.81, "exact"), gen);
        let hit = cache.get("idiot").unwrap();
        assert!(hit.is_offensive);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_miss_counted() {
        let cache = MatchCache::new();
        assert!(cache.get("nothing").is_none());
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_stale_generation_rejected() {
        let cache = MatchCache::new();
        let gen = cache.generation();
        cache.clear();
        cache.insert("idiot", DetectionResult::miss("No match"), gen);
        assert!(cache.is_empty());
        assert!(cache.get("idiot").is_none());
    }

    #[test]
    fn test_clear_empties() {
        let cache = MatchCache::new();
        cache.insert("a", DetectionResult::miss("x"), cache.generation());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
