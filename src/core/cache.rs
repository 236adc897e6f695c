//! In-memory banner cache with TTL expiry and insertion-order eviction.
//!
//! The cache avoids redundant delivery round-trips. Entries expire after
//! their TTL and are evicted lazily on the read that discovers them; there
//! is no background sweep. When the store is full, the single
//! oldest-inserted entry is evicted first — insertion order, not LRU.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::utils::now_ms;

/// A banner payload as stored by the cache and consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedBanner {
    pub html: String,
    pub width: u32,
    pub height: u32,
    pub click_url: String,
    pub impression_url: String,
    pub campaign_id: String,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    banner: CachedBanner,
    expires_at_ms: f64,
}

/// Bounded banner store keyed by slot identifier.
///
/// Invariants: at most one live entry per identifier; any entry returned
/// from [`get`](Self::get) has an expiry strictly in the future.
#[derive(Debug)]
pub struct BannerCache {
    entries: HashMap<String, CacheEntry>,
    // Insertion order, oldest first. Kept in lockstep with `entries`.
    order: VecDeque<String>,
    max_entries: usize,
}

impl BannerCache {
    /// Create a cache bounded to `max_entries` live entries (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Look up a banner; expired entries are treated as absent and
    /// deleted by the read that discovers them.
    pub fn get(&mut self, slot_id: &str) -> Option<&CachedBanner> {
        self.get_at(slot_id, now_ms())
    }

    /// Deterministic variant of [`get`](Self::get) with an explicit clock.
    pub fn get_at(&mut self, slot_id: &str, now_ms: f64) -> Option<&CachedBanner> {
        let expired = match self.entries.get(slot_id) {
            Some(entry) => entry.expires_at_ms <= now_ms,
            None => return None,
        };

        if expired {
            self.delete(slot_id);
            return None;
        }

        self.entries.get(slot_id).map(|entry| &entry.banner)
    }

    /// Store a banner with `expires_at = now + ttl_ms`, overwriting any
    /// existing entry for the identifier.
    pub fn set(&mut self, slot_id: &str, banner: CachedBanner, ttl_ms: f64) {
        self.set_at(slot_id, banner, ttl_ms, now_ms());
    }

    /// Deterministic variant of [`set`](Self::set) with an explicit clock.
    pub fn set_at(&mut self, slot_id: &str, banner: CachedBanner, ttl_ms: f64, now_ms: f64) {
        // An overwrite counts as a fresh insertion for eviction order.
        if self.entries.contains_key(slot_id) {
            self.delete(slot_id);
        } else if self.entries.len() >= self.max_entries {
            if let Some(oldest) = self.order.front().cloned() {
                self.delete(&oldest);
            }
        }

        self.entries.insert(
            slot_id.to_string(),
            CacheEntry {
                banner,
                expires_at_ms: now_ms + ttl_ms,
            },
        );
        self.order.push_back(slot_id.to_string());
    }

    /// Remove an entry if present.
    pub fn remove(&mut self, slot_id: &str) {
        self.delete(slot_id);
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Number of stored entries (expired-but-unread entries count until
    /// a lookup evicts them).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn delete(&mut self, slot_id: &str) {
        if self.entries.remove(slot_id).is_some() {
            self.order.retain(|id| id != slot_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banner(tag: &str) -> CachedBanner {
        CachedBanner {
            html: format!("<div>{tag}</div>"),
            width: 300,
            height: 250,
            click_url: "https://ads.example.com/click".into(),
            impression_url: "https://ads.example.com/imp".into(),
            campaign_id: "c1".into(),
        }
    }

    #[test]
    fn hit_until_ttl_elapses() {
        let mut cache = BannerCache::new(8);
        cache.set_at("ad-123", banner("a"), 60_000.0, 1_000.0);

        assert_eq!(cache.get_at("ad-123", 30_000.0), Some(&banner("a")));
        assert_eq!(cache.len(), 1);

        // Expiry is strict: an entry is absent from the instant now >= expiry.
        assert_eq!(cache.get_at("ad-123", 61_000.0), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn expired_entry_evicted_by_the_read_that_discovers_it() {
        let mut cache = BannerCache::new(8);
        cache.set_at("slot", banner("a"), 10.0, 0.0);

        // Not yet read: still counted.
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.get_at("slot", 100.0), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn overflow_evicts_exactly_the_oldest_inserted() {
        let mut cache = BannerCache::new(3);
        cache.set_at("s1", banner("1"), 60_000.0, 0.0);
        cache.set_at("s2", banner("2"), 60_000.0, 1.0);
        cache.set_at("s3", banner("3"), 60_000.0, 2.0);

        cache.set_at("s4", banner("4"), 60_000.0, 3.0);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get_at("s1", 4.0), None);
        assert!(cache.get_at("s2", 4.0).is_some());
        assert!(cache.get_at("s3", 4.0).is_some());
        assert!(cache.get_at("s4", 4.0).is_some());
    }

    #[test]
    fn overwrite_keeps_one_live_entry() {
        let mut cache = BannerCache::new(3);
        cache.set_at("slot", banner("old"), 60_000.0, 0.0);
        cache.set_at("slot", banner("new"), 60_000.0, 1.0);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_at("slot", 2.0), Some(&banner("new")));
    }

    #[test]
    fn overwrite_reinserts_at_back_of_eviction_order() {
        let mut cache = BannerCache::new(2);
        cache.set_at("s1", banner("1"), 60_000.0, 0.0);
        cache.set_at("s2", banner("2"), 60_000.0, 1.0);

        // Re-inserting s1 makes s2 the oldest.
        cache.set_at("s1", banner("1b"), 60_000.0, 2.0);
        cache.set_at("s3", banner("3"), 60_000.0, 3.0);

        assert_eq!(cache.get_at("s2", 4.0), None);
        assert!(cache.get_at("s1", 4.0).is_some());
        assert!(cache.get_at("s3", 4.0).is_some());
    }

    #[test]
    fn remove_and_clear() {
        let mut cache = BannerCache::new(4);
        cache.set_at("s1", banner("1"), 60_000.0, 0.0);
        cache.set_at("s2", banner("2"), 60_000.0, 0.0);

        cache.remove("s1");
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
