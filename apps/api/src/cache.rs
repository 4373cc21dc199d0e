//! Response cache — content-addressed, time-expiring store for chat-completion
//! results, so identical prompts within a session never hit the API twice.
//!
//! Expiry is lazy: a stale entry is dropped on the `get` that discovers it.
//! Entries that are never looked up again are not reclaimed — acceptable for
//! a per-session cache that dies with the session.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

struct CacheEntry {
    value: String,
    inserted_at: Instant,
}

/// Cache statistics. Hit/miss counters are monotonic for the cache lifetime.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub hit_rate_percent: f64,
    pub cache_size: usize,
}

/// In-memory cache with per-entry TTL, keyed by a SHA-256 digest of the
/// call arguments.
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    hit_count: u64,
    miss_count: u64,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            hit_count: 0,
            miss_count: 0,
        }
    }

    /// Derives the lookup key from the key parts.
    ///
    /// Each part is length-prefixed before hashing so that part boundaries
    /// are unambiguous: `("ab", "")` and `("a", "b")` hash differently.
    /// Keys are order-sensitive.
    fn derive_key(parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    /// Looks up a previously stored value. An entry older than the TTL is
    /// treated as a miss and removed.
    pub fn get(&mut self, parts: &[&str]) -> Option<String> {
        let key = Self::derive_key(parts);

        if let Some(entry) = self.entries.get(&key) {
            let age = entry.inserted_at.elapsed();
            if age < self.ttl {
                self.hit_count += 1;
                debug!("cache hit (age: {:.1}s)", age.as_secs_f64());
                return Some(entry.value.clone());
            }
            self.entries.remove(&key);
        }

        self.miss_count += 1;
        None
    }

    /// Stores a value under the derived key, resetting its TTL clock.
    pub fn set(&mut self, value: String, parts: &[&str]) {
        let key = Self::derive_key(parts);
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
        debug!("cache set (size: {})", self.entries.len());
    }

    pub fn stats(&self) -> CacheStats {
        let total = self.hit_count + self.miss_count;
        let hit_rate = if total > 0 {
            self.hit_count as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        CacheStats {
            total_requests: total,
            cache_hits: self.hit_count,
            cache_misses: self.miss_count,
            hit_rate_percent: (hit_rate * 100.0).round() / 100.0,
            cache_size: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_1h() -> ResponseCache {
        ResponseCache::new(Duration::from_secs(3600))
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let mut cache = cache_1h();
        cache.set("answer".to_string(), &["a", "b"]);
        assert_eq!(cache.get(&["a", "b"]), Some("answer".to_string()));
    }

    #[test]
    fn test_missing_key_is_miss() {
        let mut cache = cache_1h();
        assert_eq!(cache.get(&["nope"]), None);
        assert_eq!(cache.stats().cache_misses, 1);
        assert_eq!(cache.stats().cache_hits, 0);
    }

    #[test]
    fn test_expired_entry_is_miss_and_evicted() {
        // Zero TTL: every entry is already stale on the next lookup.
        let mut cache = ResponseCache::new(Duration::ZERO);
        cache.set("v".to_string(), &["k"]);
        assert_eq!(cache.stats().cache_size, 1);

        assert_eq!(cache.get(&["k"]), None);
        let stats = cache.stats();
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.cache_size, 0, "stale entry must be evicted");
    }

    #[test]
    fn test_keys_are_order_sensitive() {
        let mut cache = cache_1h();
        cache.set("first".to_string(), &["a", "b"]);
        cache.set("second".to_string(), &["b", "a"]);
        assert_eq!(cache.get(&["a", "b"]), Some("first".to_string()));
        assert_eq!(cache.get(&["b", "a"]), Some("second".to_string()));
    }

    #[test]
    fn test_no_collision_from_concatenation_ambiguity() {
        // ("ab", "") and ("a", "b") concatenate to the same string; the
        // length-prefixed key derivation must still keep them apart.
        let mut cache = cache_1h();
        cache.set("joined".to_string(), &["ab", ""]);
        assert_eq!(cache.get(&["a", "b"]), None);
        cache.set("split".to_string(), &["a", "b"]);
        assert_eq!(cache.get(&["ab", ""]), Some("joined".to_string()));
        assert_eq!(cache.get(&["a", "b"]), Some("split".to_string()));
    }

    #[test]
    fn test_hit_rate_zero_when_no_requests() {
        let cache = cache_1h();
        let stats = cache.stats();
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.hit_rate_percent, 0.0);
    }

    #[test]
    fn test_hit_rate_reported_as_percentage() {
        let mut cache = cache_1h();
        cache.set("v".to_string(), &["k"]);
        cache.get(&["k"]); // hit
        cache.get(&["other"]); // miss
        let stats = cache.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.hit_rate_percent, 50.0);
    }

    #[test]
    fn test_set_overwrites_existing_entry() {
        let mut cache = cache_1h();
        cache.set("old".to_string(), &["k"]);
        cache.set("new".to_string(), &["k"]);
        assert_eq!(cache.get(&["k"]), Some("new".to_string()));
        assert_eq!(cache.stats().cache_size, 1);
    }
}
