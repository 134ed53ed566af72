use std::num::NonZeroUsize;
use std::time::Duration;

pub const DEFAULT_FEED_TTL: Duration = Duration::from_secs(20);
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    /// How long a cached feed response stays valid.
    pub feed_ttl: Duration,
    /// Maximum number of distinct (path, query) entries kept.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            feed_ttl: DEFAULT_FEED_TTL,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    pub(crate) fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
