use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::errors::CacheError;
use crate::model::CheckResult;

/// Maps a check's cache key (check identity + params + source fingerprint)
/// to a previously computed result. Errors are never fatal: the coordinator
/// treats them as misses and evaluates fresh.
pub trait ResultCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<CheckResult>, CacheError>;
    fn put(&self, key: &str, result: &CheckResult) -> Result<(), CacheError>;
}

struct Entry {
    result: CheckResult,
    stored_at: Instant,
    last_used: Instant,
}

/// In-process result cache with a mandatory freshness window and an optional
/// LRU capacity bound. The window has no implicit default: stale pass/fail
/// being silently reused is worse than forcing the caller to choose.
pub struct MemoryCache {
    freshness_window: Duration,
    capacity: Option<usize>,
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new(freshness_window: Duration) -> Self {
        Self {
            freshness_window,
            capacity: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Bounds the cache to `capacity` entries, evicting least-recently-used
    /// entries first. Resource control only; correctness never needs it.
    pub fn with_capacity_limit(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity.max(1));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<CheckResult>, CacheError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(key) {
            Some(entry) if entry.stored_at.elapsed() <= self.freshness_window => {
                entry.last_used = Instant::now();
                Ok(Some(entry.result.clone()))
            }
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, result: &CheckResult) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        entries.insert(
            key.to_string(),
            Entry {
                result: result.clone(),
                stored_at: now,
                last_used: now,
            },
        );

        if let Some(capacity) = self.capacity {
            while entries.len() > capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.last_used)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        entries.remove(&k);
                    }
                    None => break,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CheckStatus, Severity};

    fn result(name: &str) -> CheckResult {
        CheckResult {
            run_id: 1,
            check_name: name.to_string(),
            check_description: None,
            check_params: "{}".into(),
            status: CheckStatus::Pass,
            severity: Severity::Warning,
            value: Some(42.0),
            threshold_lower: None,
            threshold_upper: Some(100.0),
            message: format!("{}: value 42 within range [-inf, 100]", name),
            served_from_cache: false,
        }
    }

    #[test]
    fn round_trip_within_window() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.put("k1", &result("row_count")).unwrap();

        let hit = cache.get("k1").unwrap().expect("hit expected");
        assert_eq!(hit.check_name, "row_count");
        assert_eq!(hit.value, Some(42.0));
        assert!(cache.get("other").unwrap().is_none());
    }

    #[test]
    fn expired_entries_miss() {
        let cache = MemoryCache::new(Duration::from_millis(20));
        cache.put("k1", &result("row_count")).unwrap();
        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get("k1").unwrap().is_none());
        // expired entry is dropped, not retained
        assert!(cache.is_empty());
    }

    #[test]
    fn lru_bound_evicts_least_recently_used() {
        let cache = MemoryCache::new(Duration::from_secs(60)).with_capacity_limit(2);
        cache.put("a", &result("a")).unwrap();
        std::thread::sleep(Duration::from_millis(2));
        cache.put("b", &result("b")).unwrap();
        std::thread::sleep(Duration::from_millis(2));

        // touch "a" so "b" becomes the LRU entry
        assert!(cache.get("a").unwrap().is_some());
        std::thread::sleep(Duration::from_millis(2));
        cache.put("c", &result("c")).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").unwrap().is_none());
        assert!(cache.get("a").unwrap().is_some());
        assert!(cache.get("c").unwrap().is_some());
    }
}
