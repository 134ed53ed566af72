//! TTL response cache storage.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;
use metrics::counter;

use super::config::CacheConfig;
use super::keys::FeedKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// A cached HTTP response payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

struct Entry {
    response: CachedResponse,
    stored_at: Instant,
}

/// Capacity-bounded LRU of feed responses with a fixed TTL.
///
/// Entries past their TTL are dropped on read, so a stale payload is never
/// served; last-writer-wins is the only consistency guarantee and is enough,
/// since the payload is deterministic within the cache window.
pub struct ResponseCache {
    ttl: Duration,
    responses: RwLock<LruCache<FeedKey, Entry>>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            ttl: config.feed_ttl,
            responses: RwLock::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    pub fn get(&self, key: &FeedKey) -> Option<CachedResponse> {
        let mut responses = rw_write(&self.responses, SOURCE, "get");
        match responses.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.response.clone()),
            Some(_) => {
                responses.pop(key);
                counter!("piazza_feed_cache_expired_total").increment(1);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: FeedKey, response: CachedResponse) {
        let entry = Entry {
            response,
            stored_at: Instant::now(),
        };
        let evicted = rw_write(&self.responses, SOURCE, "set").push(key, entry);
        if evicted.is_some() {
            counter!("piazza_feed_cache_evict_total").increment(1);
        }
    }

    /// Drop every entry. Used by tests and administrative recovery.
    pub fn clear(&self) {
        rw_write(&self.responses, SOURCE, "clear").clear();
    }

    pub fn len(&self) -> usize {
        rw_read(&self.responses, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
