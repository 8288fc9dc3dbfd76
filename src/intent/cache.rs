// Bounded TTL cache for remote intent classifications
//
// Keys are normalised command text. Entries expire after `ttl`; when the
// cache is full the oldest entry is evicted. A capacity of zero disables
// caching.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::Intent;

/// Default number of cached classifications
pub const INTENT_CACHE_ENTRIES_DEFAULT: usize = 256;

/// Default entry lifetime in seconds
pub const INTENT_CACHE_TTL_SECS_DEFAULT: u64 = 300;

#[derive(Debug, Clone)]
struct CacheEntry {
    intent: Intent,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct IntentCache {
    capacity: usize,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl IntentCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Normalised cache key for a command
    pub fn key(text: &str) -> String {
        text.trim().to_lowercase()
    }

    pub fn get(&self, text: &str) -> Option<Intent> {
        let key = Self::key(text);
        let mut entries = self.entries();
        match entries.get(&key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.intent.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, text: &str, intent: Intent) {
        if self.capacity == 0 {
            return;
        }

        let key = Self::key(text);
        let ttl = self.ttl;
        let mut entries = self.entries();
        entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);

        while entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    entries.remove(&k);
                }
                None => break,
            }
        }

        entries.insert(
            key,
            CacheEntry {
                intent,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for IntentCache {
    fn default() -> Self {
        Self::new(
            INTENT_CACHE_ENTRIES_DEFAULT,
            Duration::from_secs(INTENT_CACHE_TTL_SECS_DEFAULT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Service;

    fn intent(action: &str) -> Intent {
        Intent::new(Service::Compute, action)
    }

    #[test]
    fn hit_uses_normalised_key() {
        let cache = IntentCache::default();
        cache.insert("List Instances ", intent("list_instances"));

        assert_eq!(
            cache.get("  list instances").map(|i| i.action),
            Some("list_instances".to_string())
        );
    }

    #[test]
    fn evicts_oldest_when_full() {
        let cache = IntentCache::new(2, Duration::from_secs(60));
        cache.insert("a", intent("a"));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("b", intent("b"));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("c", intent("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn reinserting_existing_key_does_not_evict() {
        let cache = IntentCache::new(2, Duration::from_secs(60));
        cache.insert("a", intent("a"));
        cache.insert("b", intent("b"));
        cache.insert("a", intent("a2"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").map(|i| i.action), Some("a2".to_string()));
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = IntentCache::new(8, Duration::ZERO);
        cache.insert("a", intent("a"));

        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let cache = IntentCache::new(0, Duration::from_secs(60));
        cache.insert("a", intent("a"));
        assert!(cache.is_empty());
    }
}
